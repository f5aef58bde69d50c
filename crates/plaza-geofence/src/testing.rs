//! In-memory ports for exercising the ladder without a database.
//!
//! Regions are disks (center + radius) tested with haversine distance.

use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use plaza_core::{Coordinate, ResolvedRegion, ServiceRegion};
use plaza_db::{
    AddressFields, BusinessCandidateRow, BusinessLocationRow, BusinessStatistics, Capability,
    CapabilityProbe, CategoryCountRow, DbError, NearestBusinessRow, NewBusiness,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::repository::RegionRepository;
use crate::store::BusinessStore;

/// How a fake capability answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Available,
    Absent,
    NotConfigured,
    Failing,
}

fn probe<T>(mode: Mode, capability: Capability, value: impl FnOnce() -> T) -> CapabilityProbe<T> {
    match mode {
        Mode::Available => CapabilityProbe::Success(value()),
        Mode::Absent => CapabilityProbe::CapabilityAbsent(capability),
        Mode::NotConfigured => CapabilityProbe::NotConfigured,
        Mode::Failing => CapabilityProbe::HardFailure(DbError::Timeout(Duration::from_millis(50))),
    }
}

pub(crate) fn coord(lon: f64, lat: f64) -> Coordinate {
    Coordinate::new(lon, lat).expect("valid coordinate")
}

pub(crate) fn region(name: &str, is_default: bool) -> ServiceRegion {
    ServiceRegion {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: None,
        city: None,
        state: None,
        country: Some("México".to_string()),
        center: None,
        max_delivery_radius_meters: 0,
        min_order_amount: Decimal::ZERO,
        is_active: true,
        is_default,
        coverage_area_geojson: None,
    }
}

#[derive(Debug, Clone)]
pub(crate) struct DiskRegion {
    pub region: ServiceRegion,
    pub center: Coordinate,
    pub radius_meters: f64,
}

impl DiskRegion {
    pub fn new(name: &str, is_default: bool, center: Coordinate, radius_meters: f64) -> Self {
        let mut region = region(name, is_default);
        region.center = Some(center);
        #[allow(clippy::cast_possible_truncation)]
        let whole_meters = radius_meters as i32;
        region.max_delivery_radius_meters = whole_meters;
        Self {
            region,
            center,
            radius_meters,
        }
    }

    fn covers(&self, point: Coordinate) -> bool {
        self.center.distance_meters(&point) <= self.radius_meters
    }
}

pub(crate) struct FakeRegions {
    pub regions: Vec<DiskRegion>,
    pub resolver: Mode,
    pub default_lookup: Mode,
    pub containment: Mode,
    /// Replaces the computed resolver answer when set.
    pub resolver_answer: Option<Option<ResolvedRegion>>,
    pub calls: Mutex<Vec<&'static str>>,
}

impl FakeRegions {
    pub fn new(regions: Vec<DiskRegion>) -> Self {
        Self {
            regions,
            resolver: Mode::Available,
            default_lookup: Mode::Available,
            containment: Mode::Available,
            resolver_answer: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_modes(mut self, resolver: Mode, default_lookup: Mode, containment: Mode) -> Self {
        self.resolver = resolver;
        self.default_lookup = default_lookup;
        self.containment = containment;
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().expect("calls lock").push(call);
    }

    fn owning_region(&self, point: Coordinate) -> Option<ResolvedRegion> {
        let mut covering: Vec<&DiskRegion> = self
            .regions
            .iter()
            .filter(|d| d.region.is_active && d.covers(point))
            .collect();
        covering.sort_by_key(|d| !d.region.is_default);
        Some(match covering.first() {
            Some(disk) => ResolvedRegion {
                is_valid: true,
                region: Some(disk.region.clone()),
            },
            None => ResolvedRegion {
                is_valid: false,
                region: None,
            },
        })
    }
}

impl RegionRepository for FakeRegions {
    async fn resolve_region_for_point(
        &self,
        point: Coordinate,
    ) -> CapabilityProbe<Option<ResolvedRegion>> {
        self.record("resolve");
        probe(self.resolver, Capability::RegionResolver, || {
            self.resolver_answer
                .clone()
                .unwrap_or_else(|| self.owning_region(point))
        })
    }

    async fn active_default_region(&self) -> CapabilityProbe<Option<ServiceRegion>> {
        self.record("default");
        probe(self.default_lookup, Capability::DefaultRegionFunction, || {
            self.regions
                .iter()
                .find(|d| d.region.is_default && d.region.is_active)
                .map(|d| d.region.clone())
        })
    }

    async fn test_containment(&self, point: Coordinate, region_id: Uuid) -> CapabilityProbe<bool> {
        self.record("containment");
        probe(self.containment, Capability::PolygonContainment, || {
            self.regions
                .iter()
                .find(|d| d.region.id == region_id)
                .is_some_and(|d| d.covers(point))
        })
    }
}

#[derive(Debug, Clone)]
struct StoredBusiness {
    row: BusinessLocationRow,
    location: Coordinate,
}

pub(crate) struct FakeStore {
    businesses: Mutex<Vec<StoredBusiness>>,
    pub distance: Mode,
    /// Serve reads through the textual point tier.
    pub text_reads: bool,
    pub fail_writes: bool,
}

impl FakeStore {
    pub fn new() -> Self {
        Self {
            businesses: Mutex::new(Vec::new()),
            distance: Mode::Available,
            text_reads: false,
            fail_writes: false,
        }
    }

    /// Seed an active, order-accepting business and return its id.
    pub fn seed(&self, name: &str, location: Coordinate) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let row = BusinessLocationRow {
            id,
            owner_id: None,
            business_group_id: None,
            name: name.to_string(),
            slug: None,
            description: None,
            category: None,
            phone: None,
            email: None,
            address_id: None,
            is_active: true,
            accepts_orders: true,
            longitude: None,
            latitude: None,
            location_text: None,
            formatted_address: None,
            created_at: now,
            updated_at: now,
        };
        self.businesses
            .lock()
            .expect("store lock")
            .push(StoredBusiness { row, location });
        id
    }

    pub fn count(&self) -> usize {
        self.businesses.lock().expect("store lock").len()
    }

    fn eligible(&self, within: Option<Uuid>) -> Vec<StoredBusiness> {
        self.businesses
            .lock()
            .expect("store lock")
            .iter()
            .filter(|b| b.row.is_active && b.row.accepts_orders)
            .filter(|b| within.is_none_or(|id| b.row.id == id))
            .cloned()
            .collect()
    }

    fn write_failure(&self) -> Result<(), DbError> {
        if self.fail_writes {
            Err(DbError::Sqlx(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }
}

fn format_address(fields: &AddressFields) -> Option<String> {
    let street = [fields.street.as_deref(), fields.street_number.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    let parts: Vec<&str> = std::iter::once(street.as_str())
        .chain(
            [
                fields.neighborhood.as_deref(),
                fields.city.as_deref(),
                fields.state.as_deref(),
                fields.postal_code.as_deref(),
                fields.country.as_deref(),
            ]
            .into_iter()
            .flatten(),
        )
        .filter(|p| !p.is_empty())
        .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

impl BusinessStore for FakeStore {
    async fn nearest_by_distance(
        &self,
        reference: Coordinate,
        within: Option<Uuid>,
    ) -> CapabilityProbe<Option<NearestBusinessRow>> {
        probe(self.distance, Capability::DistanceOrdering, || {
            self.eligible(within)
                .into_iter()
                .map(|b| (reference.distance_meters(&b.location), b))
                .min_by(|a, b| a.0.total_cmp(&b.0))
                .map(|(meters, b)| NearestBusinessRow {
                    id: b.row.id,
                    name: b.row.name,
                    slug: b.row.slug,
                    category: b.row.category,
                    address_id: b.row.address_id,
                    longitude: Some(b.location.longitude()),
                    latitude: Some(b.location.latitude()),
                    distance_km: meters / 1000.0,
                })
        })
    }

    async fn nearest_candidates(
        &self,
        within: Option<Uuid>,
    ) -> Result<Vec<BusinessCandidateRow>, DbError> {
        Ok(self
            .eligible(within)
            .into_iter()
            .map(|b| BusinessCandidateRow {
                id: b.row.id,
                name: b.row.name,
                slug: b.row.slug,
                category: b.row.category,
                address_id: b.row.address_id,
                longitude: Some(b.location.longitude()),
                latitude: Some(b.location.latitude()),
            })
            .collect())
    }

    async fn create_business(
        &self,
        business: &NewBusiness,
        address: Option<&AddressFields>,
    ) -> Result<Uuid, DbError> {
        self.write_failure()?;
        let id = self.seed(&business.name, business.location);
        let mut businesses = self.businesses.lock().expect("store lock");
        if let Some(stored) = businesses.iter_mut().find(|b| b.row.id == id) {
            stored.row.slug.clone_from(&business.slug);
            stored.row.category.clone_from(&business.category);
            if let Some(fields) = address.filter(|a| !a.is_empty()) {
                stored.row.address_id = Some(Uuid::new_v4());
                stored.row.formatted_address = format_address(fields);
            }
        }
        Ok(id)
    }

    async fn update_business_address(
        &self,
        business_id: Uuid,
        fields: &AddressFields,
        location: Coordinate,
    ) -> Result<Uuid, DbError> {
        self.write_failure()?;
        let mut businesses = self.businesses.lock().expect("store lock");
        let stored = businesses
            .iter_mut()
            .find(|b| b.row.id == business_id)
            .ok_or(DbError::NotFound)?;
        let address_id = *stored.row.address_id.get_or_insert_with(Uuid::new_v4);
        stored.location = location;
        stored.row.formatted_address = format_address(fields);
        Ok(address_id)
    }

    async fn load_business(&self, id: Uuid) -> Result<BusinessLocationRow, DbError> {
        let businesses = self.businesses.lock().expect("store lock");
        let stored = businesses
            .iter()
            .find(|b| b.row.id == id)
            .ok_or(DbError::NotFound)?;
        let mut row = stored.row.clone();
        if self.text_reads {
            row.location_text = Some(stored.location.to_string());
        } else {
            row.longitude = Some(stored.location.longitude());
            row.latitude = Some(stored.location.latitude());
        }
        Ok(row)
    }

    async fn statistics(&self) -> Result<BusinessStatistics, DbError> {
        let businesses = self.businesses.lock().expect("store lock");
        let total = i64::try_from(businesses.len()).unwrap_or(i64::MAX);
        let active = i64::try_from(businesses.iter().filter(|b| b.row.is_active).count())
            .unwrap_or(i64::MAX);
        Ok(BusinessStatistics {
            total,
            active,
            inactive: total - active,
            with_location: total,
            by_category: vec![CategoryCountRow {
                category: None,
                count: total,
            }],
        })
    }
}
