//! Human-friendly rendering of the search state surface.

use skycast_core::{SearchUiState, WeatherSnapshot};

pub fn print_state(state: &SearchUiState) {
    match state {
        SearchUiState::Loading => println!("Loading..."),
        SearchUiState::EmptyQuery => {
            println!("Keep typing: a city lookup needs a few more characters.")
        }
        SearchUiState::SearchNotReady => {
            println!("Search is still warming up, try again shortly.")
        }
        SearchUiState::LoadFailed => println!("Could not load weather for that query."),
        SearchUiState::EmptyResult => print_no_conditions(),
        SearchUiState::Success(_) if state.is_empty() => print_no_conditions(),
        SearchUiState::Success(snapshot) => print_snapshot(snapshot),
    }
}

fn print_no_conditions() {
    println!("No conditions reported for that location.");
}

fn print_snapshot(snapshot: &WeatherSnapshot) {
    let conditions = snapshot
        .conditions
        .iter()
        .map(|c| c.description.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    println!("{} ({})", snapshot.name, snapshot.sys.country);
    println!("  {conditions}");
    println!(
        "  temperature: {:.1} C (min {:.1} / max {:.1})",
        kelvin_to_celsius(snapshot.measurements.temp),
        kelvin_to_celsius(snapshot.measurements.temp_min),
        kelvin_to_celsius(snapshot.measurements.temp_max),
    );
    println!(
        "  humidity: {}%  pressure: {} hPa  visibility: {} m",
        snapshot.measurements.humidity, snapshot.measurements.pressure, snapshot.visibility,
    );
    println!(
        "  wind: {:.1} m/s at {} deg  clouds: {}%",
        snapshot.wind.speed, snapshot.wind.deg, snapshot.clouds.all,
    );
    if let Some(observed) = snapshot.observation_time() {
        println!("  observed at {}", observed.format("%Y-%m-%d %H:%M UTC"));
    }
}

fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - 273.15
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kelvin_conversion() {
        assert!((kelvin_to_celsius(273.15) - 0.0).abs() < f64::EPSILON);
        assert!((kelvin_to_celsius(280.32) - 7.17).abs() < 0.001);
    }
}
