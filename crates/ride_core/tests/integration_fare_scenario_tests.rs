mod support;

use ride_core::geo::haversine_km;
use ride_core::pricing::SurgeProfileKind;
use ride_core::test_helpers::{
    services_at_hour, test_config, test_dropoff, test_pickup, MIDDAY_HOUR, NIGHT_HOUR, RUSH_HOUR,
};
use ride_core::RideClass;
use support::{assert_amount, assert_consistent};

#[tokio::test]
async fn downtown_to_midtown_off_peak() {
    let services = services_at_hour(test_config(), NIGHT_HOUR);
    let route = services
        .routes
        .compute_route(&test_pickup(), &test_dropoff())
        .await
        .expect("route");
    assert_eq!(route.distance_km, 5.3);
    assert_eq!(route.duration_minutes, 11);
    assert_eq!(route.eta_minutes, 11);

    let fare = services
        .fares
        .estimate_fare(&test_pickup(), &test_dropoff(), RideClass::Standard, Some(&route))
        .await
        .expect("fare");
    assert_eq!(fare.base, 5.0);
    assert_amount(fare.distance, 7.95);
    assert_amount(fare.time, 2.2);
    assert_eq!(fare.surge, 0.0);
    assert_amount(fare.total, 15.15);
    assert_eq!(fare.currency, "USD");
    assert_consistent(&fare);
}

#[tokio::test]
async fn rush_hour_adds_half_again() {
    let services = services_at_hour(test_config(), RUSH_HOUR);
    let fare = services
        .fares
        .estimate_fare(&test_pickup(), &test_dropoff(), RideClass::Standard, None)
        .await
        .expect("fare");
    // 15.15 before surge, x0.5 on top.
    assert_amount(fare.surge, 7.58);
    assert_amount(fare.total, 22.73);
    assert_consistent(&fare);
}

#[tokio::test]
async fn midday_and_flat_profiles() {
    let midday = services_at_hour(test_config(), MIDDAY_HOUR);
    assert_eq!(midday.fares.current_multiplier(), 1.2);

    let flat = services_at_hour(test_config().with_surge(SurgeProfileKind::Flat), RUSH_HOUR);
    let fare = flat
        .fares
        .estimate_fare(&test_pickup(), &test_dropoff(), RideClass::LocalLo, None)
        .await
        .expect("fare");
    assert_eq!(fare.surge, 0.0);
    assert_consistent(&fare);
}

#[tokio::test]
async fn comparison_prices_one_route_three_ways() {
    for hour in 0..24 {
        let services = services_at_hour(test_config(), hour);
        let comparison = services
            .fares
            .compare_fares(&test_pickup(), &test_dropoff())
            .await
            .expect("comparison");

        assert_eq!(comparison.fares.len(), 3);
        for fare in comparison.fares.values() {
            assert_consistent(fare);
        }
        let standard = &comparison.fares[&RideClass::Standard];
        let xl = &comparison.fares[&RideClass::BlessedXL];
        let lo = &comparison.fares[&RideClass::LocalLo];
        assert!(lo.total < standard.total && standard.total < xl.total, "hour {hour}");

        // Same route behind every class: distance components scale with per-km rates.
        assert_amount(standard.distance, comparison.route.distance_km * 1.5);
        assert_amount(xl.distance, comparison.route.distance_km * 2.0);
        assert_amount(lo.distance, comparison.route.distance_km * 1.0);
    }
}

#[tokio::test]
async fn route_path_round_trips_through_decode() {
    let services = services_at_hour(test_config(), NIGHT_HOUR);
    let route = services
        .routes
        .compute_route(&test_pickup(), &test_dropoff())
        .await
        .expect("route");
    let points = services.routes.decode_path(&route.path).expect("points");
    assert_eq!(points.len(), 4);
    assert_eq!(points[0], test_pickup().coordinate);
    assert_eq!(points[3], test_dropoff().coordinate);
    assert_eq!(ride_core::geo::encode_path(&points), route.path);
}

#[test]
fn haversine_is_symmetric_and_zero_on_self() {
    let a = test_pickup().coordinate;
    let b = test_dropoff().coordinate;
    assert_eq!(haversine_km(a, b), haversine_km(b, a));
    assert_eq!(haversine_km(a, a), 0.0);
}
