use crate::model::WeatherSnapshot;

/// The single search state rendered by the presentation layer.
///
/// Exactly one variant is active at any time. `Loading` is the well-defined
/// initial value before the first readiness signal arrives, so observers
/// never see an absent state.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchUiState {
    Loading,

    /// The query is empty or below the minimum length. Distinguishes a
    /// cleared search box from a search that returned nothing.
    EmptyQuery,

    /// A completed search with nothing to show.
    EmptyResult,

    LoadFailed,

    /// The backing search index is not populated enough to serve queries.
    SearchNotReady,

    Success(WeatherSnapshot),
}

impl SearchUiState {
    /// True for the two shapes the presentation layer renders as "no
    /// results": `EmptyResult`, and `Success` whose condition list is empty.
    pub fn is_empty(&self) -> bool {
        match self {
            SearchUiState::EmptyResult => true,
            SearchUiState::Success(snapshot) => snapshot.conditions.is_empty(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Clouds, Condition, Coord, Measurements, Sys, Wind};

    fn snapshot(conditions: Vec<Condition>) -> WeatherSnapshot {
        WeatherSnapshot {
            coord: Coord { lon: -0.13, lat: 51.51 },
            conditions,
            base: "stations".to_string(),
            measurements: Measurements {
                temp: 280.32,
                pressure: 1012,
                humidity: 81,
                temp_min: 279.15,
                temp_max: 281.15,
            },
            visibility: 10000,
            wind: Wind { speed: 4.1, deg: 80 },
            clouds: Clouds { all: 90 },
            dt: 1485789600,
            sys: Sys {
                kind: None,
                id: None,
                country: "GB".to_string(),
                sunrise: 1485762037,
                sunset: 1485794875,
            },
            id: 2643743,
            name: "London".to_string(),
            cod: 200,
        }
    }

    #[test]
    fn empty_result_is_empty() {
        assert!(SearchUiState::EmptyResult.is_empty());
    }

    #[test]
    fn success_without_conditions_is_empty() {
        assert!(SearchUiState::Success(snapshot(Vec::new())).is_empty());
    }

    #[test]
    fn success_with_conditions_is_not_empty() {
        let drizzle = Condition {
            id: 300,
            main: "Drizzle".to_string(),
            description: "light intensity drizzle".to_string(),
            icon: "09d".to_string(),
        };
        assert!(!SearchUiState::Success(snapshot(vec![drizzle])).is_empty());
    }

    #[test]
    fn other_states_are_not_empty() {
        assert!(!SearchUiState::Loading.is_empty());
        assert!(!SearchUiState::EmptyQuery.is_empty());
        assert!(!SearchUiState::LoadFailed.is_empty());
        assert!(!SearchUiState::SearchNotReady.is_empty());
    }
}
