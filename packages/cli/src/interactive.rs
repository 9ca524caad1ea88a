//! Interactive map session.
//!
//! Drives a [`MapController`] over a [`HeadlessMap`] from a `dialoguer`
//! menu: the same controls the map page offers (view toggle, metric
//! select, band width slider, clicks), with the final map state saved
//! as a snapshot on exit.

use std::sync::{Arc, Mutex, PoisonError};

use county_bands_animation::AnimationOutcome;
use county_bands_animation::clock::IntervalClock;
use county_bands_county::County;
use county_bands_county_models::Metric;
use county_bands_map::{HeadlessMap, MapController};
use dialoguer::{Input, Select};

use crate::config::MapConfig;
use crate::{parse_slider_width, write_snapshot};

/// One entry of the session menu.
enum Action {
    ToggleView,
    ChangeMetric,
    SetBandWidth,
    Inspect,
    ShowLegend,
    Quit,
}

impl Action {
    const ALL: &[Self] = &[
        Self::ToggleView,
        Self::ChangeMetric,
        Self::SetBandWidth,
        Self::Inspect,
        Self::ShowLegend,
        Self::Quit,
    ];

    fn label(&self, controller: &MapController<HeadlessMap>) -> String {
        match self {
            Self::ToggleView => controller.button_label().to_string(),
            Self::ChangeMetric => format!("Color by ({})", controller.metric().label()),
            Self::SetBandWidth => format!("Band width ({}°)", controller.displayed_width()),
            Self::Inspect => "Inspect a location".to_string(),
            Self::ShowLegend => "Show legend".to_string(),
            Self::Quit => "Save snapshot and quit".to_string(),
        }
    }
}

/// Runs the interactive session until the user quits.
///
/// # Errors
///
/// Returns an error if the map cannot be set up, user input fails, or
/// the snapshot cannot be written.
pub async fn run(
    counties: Arc<[County]>,
    config: &MapConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let map = Arc::new(Mutex::new(HeadlessMap::new()));
    let clock = Arc::new(IntervalClock::new(config.frame_interval()));
    let mut controller = MapController::load(map, counties, clock, config.view_options()?)?;

    println!("{}", controller.legend());

    loop {
        let labels: Vec<String> = Action::ALL
            .iter()
            .map(|action| action.label(&controller))
            .collect();

        let idx = Select::new()
            .with_prompt(format!("[{} view]", controller.mode()))
            .items(&labels)
            .default(0)
            .interact()?;

        match Action::ALL[idx] {
            Action::ToggleView => {
                controller.toggle_view()?;
                println!("{}", controller.legend());
            }
            Action::ChangeMetric => {
                let labels: Vec<&str> = Metric::all().iter().map(|m| m.label()).collect();
                let current = Metric::all()
                    .iter()
                    .position(|m| *m == controller.metric())
                    .unwrap_or(0);
                let choice = Select::new()
                    .with_prompt("Color by")
                    .items(&labels)
                    .default(current)
                    .interact()?;
                controller.set_metric(Metric::all()[choice])?;
                println!("{}", controller.legend());
            }
            Action::SetBandWidth => {
                let input: String = Input::new()
                    .with_prompt("Band width in degrees (0.1 - 10)")
                    .with_initial_text(controller.displayed_width().to_string())
                    .validate_with(|input: &String| parse_slider_width(input).map(|_| ()))
                    .interact_text()?;
                let width = parse_slider_width(&input)?;

                match controller.set_band_width(width).await {
                    AnimationOutcome::Completed { frames } => {
                        log::info!(
                            "Band width now {width}° ({} bands, {frames} frames)",
                            controller.bands().latest().bands.len()
                        );
                    }
                    AnimationOutcome::Superseded { frames } => {
                        log::warn!("Band width change interrupted after {frames} frames");
                    }
                }
            }
            Action::Inspect => {
                let input: String = Input::new()
                    .with_prompt("Longitude, latitude")
                    .interact_text()?;
                let Some((lng, lat)) = parse_lng_lat(&input) else {
                    log::warn!("Expected two numbers separated by a comma, got '{input}'");
                    continue;
                };

                match controller.click_at(lng, lat) {
                    Some(popup) => println!("{}", popup.html),
                    None => println!("Nothing here"),
                }
            }
            Action::ShowLegend => println!("{}", controller.legend()),
            Action::Quit => break,
        }
    }

    let map = controller
        .map()
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    write_snapshot(&map, &config.output_dir)?;
    Ok(())
}

/// Parses `"lng, lat"`.
fn parse_lng_lat(input: &str) -> Option<(f64, f64)> {
    let (lng, lat) = input.split_once(',')?;
    Some((lng.trim().parse().ok()?, lat.trim().parse().ok()?))
}
