use geovoice::bridge::{BroadcastSignal, MapRoute, MapViewUpdate, WeatherCard, ZoomStep};
use geovoice::geo::{GeoPoint, TravelMode};
use serde_json::json;

fn sample_card() -> WeatherCard {
    WeatherCard {
        location: "Mangaluru, Karnataka".to_string(),
        description: "Partly cloudy".to_string(),
        temperature: 28.4,
        feels_like: 31.2,
        humidity: 78.0,
        wind_speed: 3.4,
        weather_code: 2,
    }
}

#[test]
fn topic_names_are_stable() {
    let cases: Vec<(BroadcastSignal, &str)> = vec![
        (BroadcastSignal::CheckTraffic, "checkTraffic"),
        (BroadcastSignal::ShowTraffic, "showTraffic"),
        (BroadcastSignal::HideTraffic, "hideTraffic"),
        (BroadcastSignal::FindFasterRoute, "findFasterRoute"),
        (
            BroadcastSignal::SearchNearMe {
                query: "atm".to_string(),
            },
            "searchNearMe",
        ),
        (
            BroadcastSignal::SearchPoi {
                query: "coffee".to_string(),
                location: None,
            },
            "searchPOI",
        ),
        (
            BroadcastSignal::SendWhatsapp {
                contact: "priya".to_string(),
            },
            "sendWhatsapp",
        ),
        (BroadcastSignal::ShowWeatherCard(sample_card()), "showWeatherCard"),
        (BroadcastSignal::HideWeatherCard, "hideWeatherCard"),
        (
            BroadcastSignal::MapView(MapViewUpdate::layer_only("streets")),
            "mapView",
        ),
        (
            BroadcastSignal::MapRoute(MapRoute {
                destination: GeoPoint::new(19.07, 72.87),
                waypoints: vec![],
                mode: TravelMode::DrivingCar,
                distance_meters: 1000.0,
                duration_seconds: 600.0,
                polyline: vec![],
            }),
            "mapRoute",
        ),
    ];
    for (signal, topic) in cases {
        assert_eq!(signal.topic(), topic);
    }
}

#[test]
fn unit_topics_publish_empty_objects() {
    for signal in [
        BroadcastSignal::CheckTraffic,
        BroadcastSignal::ShowTraffic,
        BroadcastSignal::HideTraffic,
        BroadcastSignal::FindFasterRoute,
        BroadcastSignal::HideWeatherCard,
    ] {
        assert_eq!(signal.payload(), json!({}));
    }
}

#[test]
fn search_payloads_carry_query_and_optional_location() {
    let signal = BroadcastSignal::SearchNearMe {
        query: "hospital".to_string(),
    };
    assert_eq!(signal.payload(), json!({ "query": "hospital" }));

    let signal = BroadcastSignal::SearchPoi {
        query: "coffee shop".to_string(),
        location: Some("Indiranagar".to_string()),
    };
    assert_eq!(
        signal.payload(),
        json!({ "query": "coffee shop", "location": "Indiranagar" })
    );

    let signal = BroadcastSignal::SearchPoi {
        query: "fuel".to_string(),
        location: None,
    };
    assert_eq!(signal.payload(), json!({ "query": "fuel" }));
}

#[test]
fn weather_card_serializes_camel_case() {
    let payload = BroadcastSignal::ShowWeatherCard(sample_card()).payload();
    assert_eq!(payload["location"], "Mangaluru, Karnataka");
    assert_eq!(payload["feelsLike"], 31.2);
    assert_eq!(payload["windSpeed"], 3.4);
    assert_eq!(payload["weatherCode"], 2);
    assert!(payload.get("feels_like").is_none());
}

#[test]
fn weather_card_parses_collaborator_payload() {
    let card: WeatherCard = serde_json::from_value(json!({
        "location": "London, United Kingdom",
        "description": "Light drizzle",
        "temperature": 11.0,
        "feelsLike": 9.5,
        "humidity": 88.0,
        "windSpeed": 5.1,
        "weatherCode": 51
    }))
    .unwrap();
    assert_eq!(card.description, "Light drizzle");
    assert_eq!(card.weather_code, 51);
}

#[test]
fn map_view_omits_unset_fields() {
    let payload = BroadcastSignal::MapView(MapViewUpdate::layer_only("satellite")).payload();
    assert_eq!(payload, json!({ "layer": "satellite" }));

    let mut update = MapViewUpdate::layer_only("streets");
    update.zoom = Some(ZoomStep::In);
    let payload = BroadcastSignal::MapView(update).payload();
    assert_eq!(payload, json!({ "layer": "streets", "zoom": "in" }));

    let mut update = MapViewUpdate::layer_only("streets");
    update.zoom_to = Some(GeoPoint::new(12.97, 77.59));
    update.zoom_level = Some(15);
    let payload = BroadcastSignal::MapView(update).payload();
    assert_eq!(
        payload,
        json!({
            "layer": "streets",
            "zoomTo": { "lat": 12.97, "lng": 77.59 },
            "zoomLevel": 15
        })
    );
}

#[test]
fn map_route_serializes_camel_case() {
    let payload = BroadcastSignal::MapRoute(MapRoute {
        destination: GeoPoint::new(19.07, 72.87),
        waypoints: vec![GeoPoint::new(18.52, 73.85)],
        mode: TravelMode::CyclingRegular,
        distance_meters: 148_000.0,
        duration_seconds: 21_000.0,
        polyline: vec![GeoPoint::new(18.52, 73.85), GeoPoint::new(19.07, 72.87)],
    })
    .payload();
    assert_eq!(payload["distanceMeters"], 148_000.0);
    assert_eq!(payload["durationSeconds"], 21_000.0);
    assert_eq!(payload["mode"], "cycling-regular");
    assert_eq!(payload["waypoints"][0]["lat"], 18.52);
}
