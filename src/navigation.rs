//! The navigation bar: a top bar on wide screens and a bottom tab bar on phones.

use maud::{Markup, html};

use crate::endpoints;

/// Where a destination is shown on phones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// A tab in the bottom bar.
    Tab,
    /// An entry in the "More" menu.
    Menu,
}

#[derive(Debug, Clone, Copy)]
struct Destination {
    url: &'static str,
    title: &'static str,
    placement: Placement,
    is_current: bool,
}

const DESTINATIONS: [(&str, &str, Placement); 7] = [
    (endpoints::DASHBOARD_VIEW, "Dashboard", Placement::Tab),
    (endpoints::TRANSACTIONS_VIEW, "Transactions", Placement::Tab),
    (endpoints::GOALS_VIEW, "Goals", Placement::Tab),
    (endpoints::CASHFLOW_VIEW, "Cash Flow", Placement::Menu),
    (endpoints::ANALYSIS_VIEW, "Analysis", Placement::Menu),
    (endpoints::SETTINGS_VIEW, "Settings", Placement::Menu),
    (endpoints::LOG_OUT, "Log out", Placement::Menu),
];

/// Pages below a destination, e.g. "/goals/new", keep the destination highlighted.
fn is_within(page: &str, url: &str) -> bool {
    page == url
        || page
            .strip_prefix(url)
            .is_some_and(|rest| rest.starts_with('/'))
}

const TOP_LINK_STYLE: &str = "block py-2 px-3 rounded-sm lg:p-0 text-gray-900 \
    hover:bg-gray-100 lg:hover:bg-transparent lg:hover:text-blue-700 \
    dark:text-white dark:hover:bg-gray-700 lg:dark:hover:text-blue-500 \
    lg:dark:hover:bg-transparent";
const TOP_LINK_CURRENT_STYLE: &str = "block py-2 px-3 rounded-sm lg:p-0 text-white \
    bg-blue-700 lg:bg-transparent lg:text-blue-700 dark:text-white lg:dark:text-blue-500";
const TAB_STYLE: &str = "flex w-full min-w-0 items-center justify-center rounded-lg \
    px-2.5 py-2 text-xs font-semibold sm:text-sm text-gray-600 cursor-pointer \
    hover:text-blue-700 dark:text-gray-300 dark:hover:text-blue-200";
const TAB_CURRENT_STYLE: &str = "flex w-full min-w-0 items-center justify-center rounded-lg \
    px-2.5 py-2 text-xs font-semibold sm:text-sm text-blue-700 bg-blue-50 shadow-sm \
    cursor-pointer dark:bg-blue-900/30 dark:text-blue-200";
const MENU_ITEM_STYLE: &str = "block rounded-lg px-3 py-2 text-gray-700 \
    hover:bg-gray-100 dark:text-gray-200 dark:hover:bg-gray-800";
const MENU_ITEM_CURRENT_STYLE: &str = "block rounded-lg px-3 py-2 text-blue-700 \
    bg-blue-50 dark:bg-blue-900/30 dark:text-blue-200";

fn pick(is_current: bool, current: &'static str, other: &'static str) -> &'static str {
    if is_current { current } else { other }
}

pub struct NavBar {
    destinations: Vec<Destination>,
}

impl NavBar {
    /// The navigation bar as seen from the page at `current_page`.
    pub fn new(current_page: &str) -> NavBar {
        let destinations = DESTINATIONS
            .into_iter()
            .map(|(url, title, placement)| Destination {
                url,
                title,
                placement,
                is_current: url != endpoints::LOG_OUT && is_within(current_page, url),
            })
            .collect();

        NavBar { destinations }
    }

    fn by_placement(&self, placement: Placement) -> impl Iterator<Item = &Destination> {
        self.destinations
            .iter()
            .filter(move |destination| destination.placement == placement)
    }

    pub fn into_html(self) -> Markup {
        let menu_is_current = self
            .by_placement(Placement::Menu)
            .any(|destination| destination.is_current);

        html! {
            nav class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
                {
                    a href=(endpoints::DASHBOARD_VIEW) class="flex items-center gap-3"
                    {
                        img src="/static/favicon-128x128.png" alt="Zard Finance Logo" class="h-8";

                        span class="text-2xl font-semibold whitespace-nowrap dark:text-white"
                        {
                            "Zard Finance"
                        }
                    }

                    ul class="hidden lg:flex lg:flex-row lg:gap-8 font-medium"
                    {
                        @for destination in &self.destinations {
                            li
                            {
                                a
                                    href=(destination.url)
                                    class=(pick(destination.is_current, TOP_LINK_CURRENT_STYLE, TOP_LINK_STYLE))
                                    aria-current=[destination.is_current.then_some("page")]
                                {
                                    (destination.title)
                                }
                            }
                        }
                    }
                }
            }

            nav class="fixed inset-x-0 bottom-0 z-40 lg:hidden" aria-label="Primary"
            {
                ul
                    class="mx-4 mb-4 grid grid-cols-4 gap-2 rounded-xl border border-gray-200
                    bg-white/95 px-4 py-3 shadow-lg backdrop-blur
                    dark:border-gray-700 dark:bg-gray-900/95"
                {
                    @for destination in self.by_placement(Placement::Tab) {
                        li class="min-w-0"
                        {
                            a
                                href=(destination.url)
                                class=(pick(destination.is_current, TAB_CURRENT_STYLE, TAB_STYLE))
                                aria-current=[destination.is_current.then_some("page")]
                            {
                                span class="truncate" { (destination.title) }
                            }
                        }
                    }

                    li class="min-w-0"
                    {
                        details class="relative"
                        {
                            summary
                                class={ "list-none " (pick(menu_is_current, TAB_CURRENT_STYLE, TAB_STYLE)) }
                                aria-current=[menu_is_current.then_some("page")]
                            {
                                "More"
                            }

                            ul
                                class="absolute bottom-full right-0 mb-3 w-40 flex flex-col gap-1
                                rounded-xl border border-gray-200 bg-white p-2 text-sm shadow-xl
                                dark:border-gray-700 dark:bg-gray-900"
                            {
                                @for destination in self.by_placement(Placement::Menu) {
                                    li
                                    {
                                        a
                                            href=(destination.url)
                                            class=(pick(destination.is_current, MENU_ITEM_CURRENT_STYLE, MENU_ITEM_STYLE))
                                        {
                                            (destination.title)
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
