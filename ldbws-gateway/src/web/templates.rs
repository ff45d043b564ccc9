//! Askama templates for the HTML board view.

use askama::Template;
use chrono::DateTime;
use serde::Deserialize;

use crate::stations::StationCodes;

// ============================================================================
// Page Templates (extend base.html)
// ============================================================================

/// Station index linking to each departure board.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub stations: Vec<StationLink>,
}

impl IndexTemplate {
    /// Index of every known station, ordered by name.
    pub fn new(stations: &StationCodes) -> Self {
        let stations = stations
            .by_name()
            .into_iter()
            .map(|(crs, name)| StationLink {
                crs: crs.to_string(),
                name: name.to_string(),
            })
            .collect();
        Self { stations }
    }
}

/// Departure board table.
#[derive(Template)]
#[template(path = "board.html")]
pub struct BoardTemplate {
    pub board: BoardView,
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// A link on the station index.
#[derive(Debug, Clone)]
pub struct StationLink {
    pub crs: String,
    pub name: String,
}

/// The parts of a normalized station board the HTML view shows.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    #[serde(default)]
    pub location_name: String,
    #[serde(default)]
    pub filter_location_name: Option<String>,
    #[serde(default)]
    pub generated_at: Option<String>,
    #[serde(default)]
    pub train_services: Vec<DepartureView>,
}

impl BoardView {
    /// Heading, e.g. "London Kings Cross to York".
    pub fn title(&self) -> String {
        match &self.filter_location_name {
            Some(filter) => format!("{} to {}", self.location_name, filter),
            None => self.location_name.clone(),
        }
    }

    /// `generatedAt` as local wall-clock time with its offset.
    ///
    /// Falls back to the raw value when it is not RFC 3339.
    pub fn last_updated(&self) -> String {
        let Some(raw) = &self.generated_at else {
            return String::new();
        };
        DateTime::parse_from_rfc3339(raw)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S %:z").to_string())
            .unwrap_or_else(|_| raw.clone())
    }
}

/// One row of the departure table.
#[derive(Debug, Clone, Deserialize)]
pub struct DepartureView {
    #[serde(default)]
    pub operator: String,
    #[serde(default)]
    pub std: String,
    #[serde(default)]
    pub etd: String,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub destination: Vec<LocationView>,
}

impl DepartureView {
    /// Anything other than "On time" is highlighted.
    pub fn is_delayed(&self) -> bool {
        self.etd != "On time"
    }

    /// Destination names joined with ", ".
    pub fn destinations(&self) -> String {
        self.destination
            .iter()
            .map(|l| l.location_name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Platform, or "-" when not published.
    pub fn platform_display(&self) -> &str {
        self.platform.as_deref().unwrap_or("-")
    }
}

/// A destination or origin location.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationView {
    #[serde(default)]
    pub location_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stations::StationDto;

    fn departure(etd: &str) -> DepartureView {
        DepartureView {
            operator: "LNER".into(),
            std: "10:00".into(),
            etd: etd.into(),
            platform: None,
            destination: vec![],
        }
    }

    #[test]
    fn departure_delayed_unless_on_time() {
        assert!(!departure("On time").is_delayed());
        assert!(departure("Delayed").is_delayed());
        assert!(departure("10:07").is_delayed());
        assert!(departure("Cancelled").is_delayed());
    }

    #[test]
    fn departure_platform_and_destinations() {
        let mut view = departure("On time");
        assert_eq!(view.platform_display(), "-");
        assert_eq!(view.destinations(), "");

        view.platform = Some("4".into());
        view.destination = vec![
            LocationView {
                location_name: "Edinburgh".into(),
            },
            LocationView {
                location_name: "Aberdeen".into(),
            },
        ];
        assert_eq!(view.platform_display(), "4");
        assert_eq!(view.destinations(), "Edinburgh, Aberdeen");
    }

    #[test]
    fn board_view_from_normalized_json() {
        let board: BoardView = serde_json::from_str(
            r#"{
                "generatedAt": "2024-03-15T10:30:00.1234567+00:00",
                "locationName": "London Kings Cross",
                "filterLocationName": "York",
                "trainServices": [
                    {"std": "10:00", "etd": "On time", "operator": "LNER",
                     "destination": [{"locationName": "York", "crs": "YRK"}]}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(board.title(), "London Kings Cross to York");
        assert_eq!(board.last_updated(), "2024-03-15 10:30:00 +00:00");
        assert_eq!(board.train_services[0].destinations(), "York");
    }

    #[test]
    fn board_view_unparseable_timestamp_is_shown_raw() {
        let board: BoardView =
            serde_json::from_str(r#"{"locationName": "York", "generatedAt": "soon"}"#).unwrap();
        assert_eq!(board.title(), "York");
        assert_eq!(board.last_updated(), "soon");
        assert!(board.train_services.is_empty());
    }

    #[test]
    fn board_template_renders_empty_board() {
        let board: BoardView = serde_json::from_str(r#"{"locationName": "York"}"#).unwrap();
        let html = BoardTemplate { board }.render().unwrap();
        assert!(html.contains("No departures in the next 2 hours"));
    }

    #[test]
    fn index_template_links_boards() {
        let stations = StationCodes::from_stations([StationDto {
            crs_code: "KGX".into(),
            name: "London Kings Cross".into(),
        }]);
        let html = IndexTemplate::new(&stations).render().unwrap();
        assert!(html.contains(r#"href="d/KGX""#));
        assert!(html.contains("London Kings Cross"));
    }
}
