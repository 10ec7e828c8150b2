//! ECharts charts for the cash flow page.
//!
//! Charts are built with charming and serialized to JSON options. The
//! containers are rendered together with an inline script that initializes
//! them, so charts also work in fragments swapped in by htmx.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    datatype::DataPointItem,
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger,
    },
    series::{Line, Pie},
};
use maud::{Markup, PreEscaped, html};

use crate::{
    aggregation::{Bucket, CategoryTotal, PeriodKey},
    html::HeadElement,
    profile::Currency,
};

/// A chart with its HTML container ID and ECharts configuration.
pub struct PageChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// The ECharts library, which must be loaded before [charts_view] is rendered.
pub fn echarts_script() -> HeadElement {
    HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned())
}

/// Renders the chart containers and the script that draws into them.
pub fn charts_view(charts: &[PageChart]) -> Markup {
    html! {
        section id="charts" class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div id=(chart.id) class="min-h-[380px] rounded dark:bg-gray-100" {}
                }
            }

            script { (charts_script(charts)) }
        }
    }
}

fn charts_script(charts: &[PageChart]) -> PreEscaped<String> {
    let script = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    if (!chartDom || typeof echarts === 'undefined') return;
                    const chart = echarts.getInstanceByDom(chartDom) || echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option, true);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        chart.setTheme(darkModeMediaQuery.matches ? 'dark' : 'default');
                    }};
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    PreEscaped(script)
}

/// Income, expenses and balance for each day of a month with `days_in_month` days.
///
/// Days without transactions are shown as zero.
pub fn daily_cashflow_chart(daily: &[Bucket], days_in_month: u8, currency: Currency) -> Chart {
    let mut income = vec![0.0; days_in_month as usize];
    let mut expense = vec![0.0; days_in_month as usize];

    for bucket in daily {
        if let PeriodKey::Day(day) = bucket.key
            && (1..=days_in_month).contains(&day)
        {
            income[day as usize - 1] = bucket.totals.income;
            expense[day as usize - 1] = bucket.totals.expense;
        }
    }

    let balance = income
        .iter()
        .zip(&expense)
        .map(|(income, expense)| income - expense)
        .collect::<Vec<_>>();
    let labels = (1..=days_in_month)
        .map(|day| day.to_string())
        .collect::<Vec<_>>();

    Chart::new()
        .title(Title::new().text("Daily Cash Flow"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .value_formatter(currency_formatter(currency))
                .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow)),
        )
        .legend(Legend::new().top("1%").right("4%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(60)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter(currency))),
        )
        .series(Line::new().name("Income").data(income))
        .series(Line::new().name("Expenses").data(expense))
        .series(Line::new().name("Balance").data(balance))
}

/// The share of each category in `breakdown`.
pub fn category_pie_chart(title: &str, breakdown: &[CategoryTotal], currency: Currency) -> Chart {
    let data = breakdown
        .iter()
        .map(|category_total| {
            DataPointItem::new(category_total.amount).name(category_total.category.label())
        })
        .collect::<Vec<_>>();

    Chart::new()
        .title(Title::new().text(title))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter(currency)),
        )
        .legend(Legend::new().bottom("1%"))
        .series(
            Pie::new()
                .name(title)
                .radius(vec!["40%", "70%"])
                .data(data),
        )
}

fn currency_formatter(currency: Currency) -> JsFunction {
    JsFunction::new_with_args(
        "number",
        &format!(
            "const currencyFormatter = new Intl.NumberFormat('en-US', {{
                  style: 'currency',
                  currency: '{}'
                }});
                return (number) ? currencyFormatter.format(number) : \"-\";",
            currency.code()
        ),
    )
}
