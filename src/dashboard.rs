//! Dashboard views: which sections, charts and notices a filter selection produces.
//!
//! Views are rebuilt from the immutable tidy set on every filter change.

use crate::charts::{ChartKind, ChartSpec};
use crate::data::{FilterAxis, FilterSelection, SelectionNotice, TidyRecord, TidySet};
use crate::stats::{Dimension, RollupCalculator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DashboardKind {
    Rail,
    Port,
}

impl DashboardKind {
    pub fn title(self) -> &'static str {
        match self {
            DashboardKind::Rail => "Rail Dashboard",
            DashboardKind::Port => "US Ports Activity Dashboard",
        }
    }

    /// Name of the category axis in the sidebar and in notices.
    pub fn category_label(self) -> &'static str {
        match self {
            DashboardKind::Rail => "Railroad",
            DashboardKind::Port => "Port",
        }
    }

    pub fn detail_label(self) -> &'static str {
        match self {
            DashboardKind::Rail => "Commodity",
            DashboardKind::Port => "Detail",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            DashboardKind::Rail => "Carloads",
            DashboardKind::Port => "TEU",
        }
    }

    /// Initial sidebar selection. Ports start with the first two, as comparing
    /// every port at once is unreadable.
    pub fn default_selection(self, set: &TidySet) -> FilterSelection {
        let all = FilterSelection::all(set);
        match self {
            DashboardKind::Rail => all,
            DashboardKind::Port => all.with_categories(set.categories().into_iter().take(2)),
        }
    }
}

/// A titled block of the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: &'static str,
    pub title: String,
    /// Shown above the charts when some of the selection has no data.
    pub warning: Option<String>,
    pub body: SectionBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionBody {
    Charts(Vec<ChartSpec>),
    Notice(String),
}

impl Section {
    fn charts(id: &'static str, title: &str, charts: Vec<ChartSpec>) -> Self {
        Self {
            id,
            title: title.to_string(),
            warning: None,
            body: SectionBody::Charts(charts),
        }
    }

    fn notice(id: &'static str, title: &str, message: impl Into<String>) -> Self {
        Self {
            id,
            title: title.to_string(),
            warning: None,
            body: SectionBody::Notice(message.into()),
        }
    }

    pub fn chart_specs(&self) -> &[ChartSpec] {
        match &self.body {
            SectionBody::Charts(charts) => charts,
            SectionBody::Notice(_) => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub kind: DashboardKind,
    pub sections: Vec<Section>,
}

impl DashboardView {
    pub fn build(kind: DashboardKind, set: &TidySet, filter: &FilterSelection) -> Self {
        let sections = match kind {
            DashboardKind::Rail => rail_sections(set, filter),
            DashboardKind::Port => port_sections(set, filter),
        };
        Self { kind, sections }
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn charts(&self) -> impl Iterator<Item = &ChartSpec> {
        self.sections.iter().flat_map(Section::chart_specs)
    }
}

/// Notice text with the dashboard's own name for the category axis.
pub fn notice_message(kind: DashboardKind, notice: &SelectionNotice) -> String {
    match notice {
        SelectionNotice::NothingSelected(FilterAxis::Category) => format!(
            "Please select at least one {}.",
            kind.category_label().to_lowercase()
        ),
        SelectionNotice::PartialData { missing } => format!(
            "The following {}s have no data for the selected period: {}",
            kind.category_label().to_lowercase(),
            missing.join(", ")
        ),
        other => other.to_string(),
    }
}

fn chart(
    kind: DashboardKind,
    id: &str,
    title: &str,
    chart_kind: ChartKind,
    records: &[TidyRecord],
    x: Dimension,
    series: Option<Dimension>,
) -> ChartSpec {
    let dims: Vec<Dimension> = std::iter::once(x).chain(series).collect();
    ChartSpec {
        id: id.to_string(),
        title: title.to_string(),
        kind: chart_kind,
        x,
        series,
        x_label: axis_label(kind, x).to_string(),
        y_label: kind.unit().to_string(),
        rollups: RollupCalculator::rollup(records, &dims),
    }
}

fn axis_label(kind: DashboardKind, dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Category => kind.category_label(),
        Dimension::Detail => kind.detail_label(),
        other => other.label(),
    }
}

// ── Port dashboard ────────────────────────────────────────────────────────────

fn port_sections(set: &TidySet, filter: &FilterSelection) -> Vec<Section> {
    let kind = DashboardKind::Port;
    let mut sections = vec![Section::charts(
        "port_trend",
        "Monthly Container Throughput for All Ports",
        vec![chart(
            kind,
            "port_trend_line",
            "Monthly Container Throughput for All Ports",
            ChartKind::Line,
            set.records(),
            Dimension::Date,
            Some(Dimension::Category),
        )],
    )];

    sections.push(port_selection_section(set, filter));
    sections.push(port_seasonal_section(set, filter));
    sections
}

fn port_selection_section(set: &TidySet, filter: &FilterSelection) -> Section {
    const ID: &str = "port_selection";
    const TITLE: &str = "Selected Ports and Period";
    const SELECT_PROMPT: &str = "Please select at least one port and one date range.";
    let kind = DashboardKind::Port;

    let in_period = set
        .records()
        .iter()
        .any(|r| filter.years.contains(&r.year()) && filter.months.contains(&r.month()));
    if filter.categories.is_empty() || !in_period {
        return Section::notice(ID, TITLE, SELECT_PROMPT);
    }

    let selection = filter.apply(set);
    let warning = match &selection.notice {
        Some(notice @ SelectionNotice::PartialData { .. }) => Some(notice_message(kind, notice)),
        _ => None,
    };
    if selection.is_empty() {
        let mut section = Section::notice(
            ID,
            TITLE,
            "No valid data available for the selected ports and period.",
        );
        section.warning = warning;
        return section;
    }

    let records = &selection.records;
    let mut section = Section::charts(
        ID,
        TITLE,
        vec![
            chart(
                kind,
                "port_stacked_bar",
                "Stacked Bar Chart of Monthly Throughput",
                ChartKind::StackedBar,
                records,
                Dimension::Category,
                Some(Dimension::Date),
            ),
            chart(
                kind,
                "port_share_pie",
                "Throughput Share for Selected Period",
                ChartKind::Pie,
                records,
                Dimension::Category,
                None,
            ),
            chart(
                kind,
                "port_volume_bubble",
                "Bubble Chart of Total Container Volume by Port",
                ChartKind::Bubble,
                records,
                Dimension::Category,
                None,
            ),
        ],
    );
    section.warning = warning;
    section
}

/// Seasonal totals over the whole period, restricted to the selected ports only.
fn port_seasonal_section(set: &TidySet, filter: &FilterSelection) -> Section {
    const ID: &str = "port_seasonal";
    const TITLE: &str = "Seasonal Variation in Container Throughput";
    let kind = DashboardKind::Port;

    let records: Vec<TidyRecord> = set
        .records()
        .iter()
        .filter(|r| filter.categories.contains(&r.category))
        .cloned()
        .collect();
    if records.is_empty() {
        return Section::notice(
            ID,
            TITLE,
            "Please select at least one port for seasonal analysis.",
        );
    }

    Section::charts(
        ID,
        TITLE,
        vec![
            chart(
                kind,
                "port_seasonal_bar",
                "Seasonal Container Throughput by Port",
                ChartKind::StackedBar,
                &records,
                Dimension::Category,
                Some(Dimension::Season),
            ),
            chart(
                kind,
                "port_seasonal_pie",
                "Total Seasonal Container Throughput",
                ChartKind::Pie,
                &records,
                Dimension::Season,
                None,
            ),
        ],
    )
}

// ── Rail dashboard ────────────────────────────────────────────────────────────

fn rail_sections(set: &TidySet, filter: &FilterSelection) -> Vec<Section> {
    let kind = DashboardKind::Rail;
    let all = set.records();

    let mut sections = vec![
        Section::charts(
            "rail_trend_railroad",
            "Trend of Carloads Over Time by Railroad",
            vec![chart(
                kind,
                "rail_trend_railroad_line",
                "Trend of Carloads Over Time by Railroad",
                ChartKind::Line,
                all,
                Dimension::Date,
                Some(Dimension::Category),
            )],
        ),
        Section::charts(
            "rail_trend_commodity",
            "Trend of Carloads Over Time by Commodity Type",
            vec![chart(
                kind,
                "rail_trend_commodity_line",
                "Trend of Carloads Over Time by Commodity Type",
                ChartKind::Line,
                all,
                Dimension::Date,
                Some(Dimension::Detail),
            )],
        ),
    ];

    sections.push(rail_filtered_section(set, filter));
    sections
}

fn rail_filtered_section(set: &TidySet, filter: &FilterSelection) -> Section {
    const ID: &str = "rail_filtered";
    const TITLE: &str = "Filtered Data Visualizations";
    let kind = DashboardKind::Rail;

    let selection = filter.apply(set);
    let mut warning = None;
    match &selection.notice {
        Some(notice) if notice.is_blocking() => {
            return Section::notice(ID, TITLE, notice_message(kind, notice));
        }
        Some(notice) => warning = Some(notice_message(kind, notice)),
        None => {}
    }

    let records = &selection.records;
    let year_season = RollupCalculator::pivot(records, Dimension::Year, Dimension::Season);
    let year_season_percent = ChartSpec {
        id: "rail_year_season_percent".to_string(),
        title: "Percentage of Carloads by Year and Season".to_string(),
        kind: ChartKind::StackedBar,
        x: Dimension::Year,
        series: Some(Dimension::Season),
        x_label: "Year".to_string(),
        y_label: "Percent".to_string(),
        rollups: year_season.row_shares().to_rollups(),
    };

    let mut section = Section::charts(
        ID,
        TITLE,
        vec![
            chart(
                kind,
                "rail_year_month",
                "Total Carloads by Year and Month",
                ChartKind::StackedBar,
                records,
                Dimension::Year,
                Some(Dimension::Month),
            ),
            chart(
                kind,
                "rail_year_season",
                "Total Carloads by Year and Season",
                ChartKind::StackedBar,
                records,
                Dimension::Year,
                Some(Dimension::Season),
            ),
            year_season_percent,
            chart(
                kind,
                "rail_railroad_season",
                "Total Carloads by Railroad and Season",
                ChartKind::StackedBar,
                records,
                Dimension::Category,
                Some(Dimension::Season),
            ),
            chart(
                kind,
                "rail_season_pie",
                "Total Carloads by Season",
                ChartKind::Pie,
                records,
                Dimension::Season,
                None,
            ),
            chart(
                kind,
                "rail_month_pie",
                "Total Carloads by Month",
                ChartKind::Pie,
                records,
                Dimension::Month,
                None,
            ),
        ],
    );
    section.warning = warning;
    section
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Season;
    use crate::stats::GroupValue;
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    fn rec(y: i32, m: u32, cat: &str, v: f64) -> TidyRecord {
        TidyRecord::new(NaiveDate::from_ymd_opt(y, m, 1).unwrap(), cat, v)
    }

    fn ports() -> TidySet {
        TidySet::new(vec![
            rec(2021, 1, "LA", 100.0),
            rec(2021, 6, "LA", 50.0),
            rec(2021, 6, "NY", 200.0),
            rec(2022, 3, "SEA", 10.0),
        ])
    }

    fn rail() -> TidySet {
        TidySet::new(vec![
            rec(2021, 12, "BNSF", 100.0).with_detail("Coal"),
            rec(2022, 1, "BNSF", 50.0).with_detail("Grain"),
            rec(2022, 7, "UP", 30.0).with_detail("Coal"),
        ])
    }

    fn notice_of(view: &DashboardView, id: &str) -> Option<String> {
        match &view.section(id)?.body {
            SectionBody::Notice(msg) => Some(msg.clone()),
            SectionBody::Charts(_) => None,
        }
    }

    #[test]
    fn test_port_default_selects_first_two_ports() {
        let filter = DashboardKind::Port.default_selection(&ports());
        let expected: BTreeSet<String> = ["LA", "NY"].iter().map(|s| s.to_string()).collect();
        assert_eq!(filter.categories, expected);
    }

    #[test]
    fn test_port_view_default_has_all_sections() {
        let set = ports();
        let filter = DashboardKind::Port.default_selection(&set);
        let view = DashboardView::build(DashboardKind::Port, &set, &filter);

        let ids: Vec<&str> = view.sections.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["port_trend", "port_selection", "port_seasonal"]);
        assert_eq!(view.charts().count(), 6);

        let pie = view
            .charts()
            .find(|c| c.id == "port_share_pie")
            .expect("share pie");
        assert_eq!(pie.rollups.len(), 2);
        assert_eq!(pie.rollups[0].total, 150.0);
    }

    #[test]
    fn test_port_partial_selection_warns_and_still_charts() {
        let set = ports();
        let mut filter = FilterSelection::all(&set).with_categories(["LA", "SEA"]);
        filter.years = [2021].into_iter().collect();
        let view = DashboardView::build(DashboardKind::Port, &set, &filter);

        let section = view.section("port_selection").expect("section");
        assert_eq!(
            section.warning.as_deref(),
            Some("The following ports have no data for the selected period: SEA")
        );
        assert_eq!(section.chart_specs().len(), 3);
    }

    #[test]
    fn test_port_empty_months_prompts_for_selection() {
        let set = ports();
        let mut filter = FilterSelection::all(&set);
        filter.years = [2021].into_iter().collect();
        filter.months.clear();
        let view = DashboardView::build(DashboardKind::Port, &set, &filter);

        assert_eq!(
            notice_of(&view, "port_selection").as_deref(),
            Some("Please select at least one port and one date range.")
        );
        // Seasonal analysis ignores the period filter.
        assert!(notice_of(&view, "port_seasonal").is_none());
    }

    #[test]
    fn test_port_no_ports_selected() {
        let set = ports();
        let filter = FilterSelection::all(&set).with_categories(Vec::<String>::new());
        let view = DashboardView::build(DashboardKind::Port, &set, &filter);

        assert_eq!(
            notice_of(&view, "port_seasonal").as_deref(),
            Some("Please select at least one port for seasonal analysis.")
        );
        assert_eq!(view.charts().count(), 1);
    }

    #[test]
    fn test_port_selected_ports_all_missing_in_period() {
        let set = ports();
        let mut filter = FilterSelection::all(&set).with_categories(["SEA"]);
        filter.years = [2021].into_iter().collect();
        let view = DashboardView::build(DashboardKind::Port, &set, &filter);

        assert_eq!(
            notice_of(&view, "port_selection").as_deref(),
            Some("No valid data available for the selected ports and period.")
        );
    }

    #[test]
    fn test_rail_view_rolls_december_and_january_into_winter() {
        let set = rail();
        let view = DashboardView::build(DashboardKind::Rail, &set, &FilterSelection::all(&set));

        let railroad_season = view
            .charts()
            .find(|c| c.id == "rail_railroad_season")
            .expect("railroad season chart");
        let bnsf_winter = railroad_season
            .rollups
            .iter()
            .find(|r| {
                r.keys
                    == vec![
                        GroupValue::Text("BNSF".to_string()),
                        GroupValue::Season(Season::Winter),
                    ]
            })
            .expect("BNSF winter");
        assert_eq!(bnsf_winter.total, 150.0);

        let commodity = view
            .charts()
            .find(|c| c.id == "rail_trend_commodity_line")
            .expect("commodity trend");
        assert_eq!(commodity.rollups.len(), 3);
    }

    #[test]
    fn test_rail_percent_chart_rows_sum_to_hundred() {
        let set = rail();
        let view = DashboardView::build(DashboardKind::Rail, &set, &FilterSelection::all(&set));
        let percent = view
            .charts()
            .find(|c| c.id == "rail_year_season_percent")
            .expect("percent chart");

        let total_2022: f64 = percent
            .rollups
            .iter()
            .filter(|r| r.keys[0] == GroupValue::Year(2022))
            .map(|r| r.total)
            .sum();
        assert!((total_2022 - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_rail_empty_railroads_shows_notice() {
        let set = rail();
        let filter = FilterSelection::all(&set).with_categories(Vec::<String>::new());
        let view = DashboardView::build(DashboardKind::Rail, &set, &filter);

        assert_eq!(
            notice_of(&view, "rail_filtered").as_deref(),
            Some("Please select at least one railroad.")
        );
        // Trend sections are unfiltered.
        assert_eq!(view.charts().count(), 2);
    }
}
