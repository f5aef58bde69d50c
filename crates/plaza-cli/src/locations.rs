use plaza_core::{Coordinate, LocationValidationResult, ValidationStatus};
use plaza_geofence::PgBusinessLocationService;
use uuid::Uuid;

/// Print the active default region.
///
/// # Errors
///
/// Returns an error if regions are not configured or the store fails.
pub(crate) async fn run_active_region(service: &PgBusinessLocationService) -> anyhow::Result<()> {
    match service.active_region().await? {
        Some(region) => {
            println!("Region:  {} ({})", region.name, region.id);
            if let Some(center) = region.center {
                println!("Center:  {center}");
            }
            println!("Radius:  {} m", region.max_delivery_radius_meters);
            println!("Default: {}", region.is_default);
        }
        None => println!("{}", plaza_core::regions::NO_ACTIVE_REGION_MESSAGE),
    }
    Ok(())
}

/// Run the validation ladder for one point and print the outcome.
///
/// # Errors
///
/// Returns an error for out-of-range input or a hard store failure.
pub(crate) async fn run_validate(
    service: &PgBusinessLocationService,
    longitude: f64,
    latitude: f64,
) -> anyhow::Result<()> {
    let point = Coordinate::new(longitude, latitude)?;
    let result = service.validate_before_write(point).await?;
    println!("{}", describe(&result));
    Ok(())
}

/// # Errors
///
/// Returns an error when no business qualifies or the store fails.
pub(crate) async fn run_nearest(
    service: &PgBusinessLocationService,
    longitude: f64,
    latitude: f64,
    business_id: Option<Uuid>,
) -> anyhow::Result<()> {
    let reference = Coordinate::new(longitude, latitude)?;
    let nearest = service.find_nearest(reference, business_id).await?;
    println!(
        "{} ({}) {:.3} km",
        nearest.name, nearest.id, nearest.distance_km
    );
    Ok(())
}

/// # Errors
///
/// Returns an error if the statistics query fails.
pub(crate) async fn run_stats(service: &PgBusinessLocationService) -> anyhow::Result<()> {
    let stats = service.statistics().await?;
    println!(
        "total {}  active {}  inactive {}  with location {}",
        stats.total, stats.active, stats.inactive, stats.with_location
    );
    for row in &stats.by_category {
        println!(
            "  {:<24}{}",
            row.category.as_deref().unwrap_or("(none)"),
            row.count
        );
    }
    Ok(())
}

pub(crate) fn describe(result: &LocationValidationResult) -> String {
    let verdict = match result.status {
        ValidationStatus::Covered => "covered",
        ValidationStatus::Degraded => "accepted (degraded)",
        ValidationStatus::OutOfCoverage => "rejected",
        ValidationStatus::NotConfigured => "rejected (not configured)",
    };
    match &result.region {
        Some(region) => format!("{verdict}: {} [{}]", result.message, region.name),
        None => format!("{verdict}: {}", result.message),
    }
}
