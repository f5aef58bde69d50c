use serde_json::json;

use super::*;

fn coord(lon: f64, lat: f64) -> Coordinate {
    Coordinate::new(lon, lat).expect("valid coordinate")
}

#[test]
fn object_form_reads_x_as_longitude() {
    let raw = json!({ "x": -99.16, "y": 19.422 });
    assert_eq!(normalize(&raw), Some(coord(-99.16, 19.422)));
}

#[test]
fn wkt_text_form() {
    let raw = json!("POINT(-99.16 19.422)");
    assert_eq!(normalize(&raw), Some(coord(-99.16, 19.422)));
}

#[test]
fn wkt_with_srid_and_spacing() {
    assert_eq!(
        normalize_text("SRID=4326;POINT ( -99.16   19.422 )"),
        Some(coord(-99.16, 19.422))
    );
}

#[test]
fn wkt_is_case_insensitive() {
    assert_eq!(
        normalize_text("point(10.5 -3.25)"),
        Some(coord(10.5, -3.25))
    );
}

#[test]
fn native_point_literal() {
    assert_eq!(
        normalize_text("(-99.16,19.422)"),
        Some(coord(-99.16, 19.422))
    );
}

#[test]
fn geojson_point_object() {
    let raw = json!({ "type": "Point", "coordinates": [-99.16, 19.422] });
    assert_eq!(normalize(&raw), Some(coord(-99.16, 19.422)));
}

#[test]
fn object_and_text_forms_agree_across_the_globe() {
    let samples = [
        (-180.0, -90.0),
        (180.0, 90.0),
        (0.0, 0.0),
        (-99.160_000_1, 19.422_000_9),
        (139.691_706, 35.689_487),
        (-0.000_001, 0.000_001),
        (12.345_678_901_234, -45.678_901_234_567),
    ];
    for (lon, lat) in samples {
        let object = normalize(&json!({ "x": lon, "y": lat }));
        let text = normalize(&json!(format!("POINT({lon} {lat})")));
        assert_eq!(object, text, "forms disagree for ({lon}, {lat})");
        assert_eq!(object, Some(coord(lon, lat)));
    }
}

#[test]
fn object_and_text_forms_agree_on_a_grid() {
    let mut lon = -180.0_f64;
    while lon <= 180.0 {
        let mut lat = -90.0_f64;
        while lat <= 90.0 {
            let object = normalize(&json!({ "x": lon, "y": lat }));
            let text = normalize_text(&format!("POINT({lon} {lat})"));
            assert_eq!(object, text, "forms disagree for ({lon}, {lat})");
            assert!(object.is_some());
            lat += 7.5;
        }
        lon += 12.25;
    }
}

#[test]
fn malformed_inputs_return_none() {
    let cases = [
        json!(""),
        json!("POINT()"),
        json!("POINT(abc def)"),
        json!("POINT(1.0)"),
        json!("POINT(1 2 3)"),
        json!("LINESTRING(0 0, 1 1)"),
        json!("POINT(NaN 1)"),
        json!("POINT(inf 1)"),
        json!({ "x": "1.0", "y": 2.0 }),
        json!({ "x": 1.0 }),
        json!({ "y": 1.0 }),
        json!({}),
        json!({ "type": "Point", "coordinates": [1.0] }),
        json!({ "type": "LineString", "coordinates": [1.0, 2.0] }),
        json!(null),
        json!(42),
        json!(true),
        json!([1.0, 2.0]),
    ];
    for raw in &cases {
        assert_eq!(normalize(raw), None, "expected None for {raw}");
    }
}

#[test]
fn out_of_range_components_return_none() {
    assert_eq!(normalize(&json!({ "x": 181.0, "y": 0.0 })), None);
    assert_eq!(normalize_text("POINT(0 91)"), None);
    assert_eq!(normalize_text("(-200,10)"), None);
}

#[test]
fn x_y_takes_precedence_over_geojson() {
    let raw = json!({
        "x": 1.0,
        "y": 2.0,
        "type": "Point",
        "coordinates": [3.0, 4.0]
    });
    assert_eq!(normalize(&raw), Some(coord(1.0, 2.0)));
}
