//! Record shapes of the LDBWS responses.
//!
//! These map directly to the LDBWS JSON API responses. The service omits
//! fields rather than sending null values in many cases, so every field is
//! optional and the projector only emits what the source carried.

use super::projection::{FieldSpec, Projection};

/// A list of plain strings (`adhocAlerts`).
const STRINGS: Projection = Projection::Many(&Projection::Primitive);

/// Origin or destination location of a service.
pub const SERVICE_LOCATION: &[FieldSpec] = &[
    FieldSpec::primitive("futureChangeTo"),
    FieldSpec::primitive("via"),
    FieldSpec::primitive("crs"),
    FieldSpec::primitive("locationName"),
    FieldSpec::primitive("assoclsCancelled"),
];

const SERVICE_LOCATIONS: Projection = Projection::Many(&Projection::Record(SERVICE_LOCATION));

/// A service on a station board.
pub const SERVICE_ITEM: &[FieldSpec] = &[
    FieldSpec::primitive("sta"),
    FieldSpec::primitive("eta"),
    FieldSpec::primitive("std"),
    FieldSpec::primitive("etd"),
    FieldSpec::primitive("platform"),
    FieldSpec::primitive("operator"),
    FieldSpec::primitive("operatorCode"),
    FieldSpec::primitive("isCircularRoute"),
    FieldSpec::primitive("serviceID"),
    FieldSpec::nested("origin", SERVICE_LOCATIONS),
    FieldSpec::nested("destination", SERVICE_LOCATIONS),
    FieldSpec::nested("adhocAlerts", STRINGS),
];

const SERVICE_ITEMS: Projection = Projection::Many(&Projection::Record(SERVICE_ITEM));

/// Response from `GetDepartureBoard` or `GetArrivalBoard`.
pub const STATION_BOARD: &[FieldSpec] = &[
    FieldSpec::primitive("generatedAt"),
    FieldSpec::primitive("locationName"),
    FieldSpec::primitive("crs"),
    FieldSpec::primitive("filterLocationName"),
    FieldSpec::primitive("filtercrs"),
    FieldSpec::primitive("filterType"),
    FieldSpec::primitive("platformAvailable"),
    FieldSpec::primitive("areServicesAvailable"),
    FieldSpec::nested("trainServices", SERVICE_ITEMS),
    FieldSpec::nested("busServices", SERVICE_ITEMS),
    FieldSpec::nested("ferryServices", SERVICE_ITEMS),
    // Messages arrive as `{"Value": "..."}` objects; only the text is kept.
    FieldSpec::nested(
        "nrccMessages",
        Projection::Many(&Projection::Within("Value", &Projection::Primitive)),
    ),
];

/// A single calling point (station stop).
pub const CALLING_POINT: &[FieldSpec] = &[
    FieldSpec::primitive("locationName"),
    FieldSpec::primitive("crs"),
    FieldSpec::primitive("st"),
    FieldSpec::primitive("et"),
    FieldSpec::primitive("at"),
    FieldSpec::nested("adhocAlerts", STRINGS),
];

/// Calling points grouped per portion of a train.
///
/// Each element of the source array wraps its calling points in a
/// `callingPoint` field; split/join services carry more than one list.
const CALLING_POINT_LISTS: Projection = Projection::Many(&Projection::Within(
    "callingPoint",
    &Projection::Many(&Projection::Record(CALLING_POINT)),
));

/// Response from `GetServiceDetails`.
pub const SERVICE_DETAILS: &[FieldSpec] = &[
    FieldSpec::primitive("generatedAt"),
    FieldSpec::primitive("serviceType"),
    FieldSpec::primitive("locationName"),
    FieldSpec::primitive("crs"),
    FieldSpec::primitive("operator"),
    FieldSpec::primitive("operatorCode"),
    FieldSpec::primitive("isCancelled"),
    FieldSpec::primitive("disruptionReason"),
    FieldSpec::primitive("overdueMessage"),
    FieldSpec::primitive("platform"),
    FieldSpec::primitive("sta"),
    FieldSpec::primitive("eta"),
    FieldSpec::primitive("ata"),
    FieldSpec::primitive("std"),
    FieldSpec::primitive("etd"),
    FieldSpec::primitive("atd"),
    FieldSpec::nested("adhocAlerts", STRINGS),
    FieldSpec::nested("previousCallingPoints", CALLING_POINT_LISTS),
    FieldSpec::nested("subsequentCallingPoints", CALLING_POINT_LISTS),
];
