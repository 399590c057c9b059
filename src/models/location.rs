use serde::Serialize;

use crate::geo::Point;

/// The profile fields location resolution reads. Consumed read-only; the
/// profile itself is owned by the (out of scope) user subsystem.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub profile_image: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub notification_radius_miles: Option<f64>,
    pub show_city_only: bool,
    pub is_active: bool,
}

/// The effective location of a feed request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LocationScope {
    /// Radius query around the user's stored coordinates.
    Geographic { origin: Point, radius_miles: f64 },
    /// Exact city/state match.
    City { city: String, state: Option<String> },
    /// No location filter: the final fallback for users with neither
    /// coordinates nor a home city. All recent posts, distance 0.
    Unfiltered,
}

/// Resolves a profile into a location scope. Deterministic, no side effects.
///
/// Geographic mode requires both coordinates and `show_city_only` off; a
/// missing or non-positive radius preference falls back to
/// `default_radius_miles`. Otherwise city mode when a home city exists, and
/// the unfiltered fallback last.
#[must_use]
pub fn resolve_location(profile: &UserProfile, default_radius_miles: f64) -> LocationScope {
    if !profile.show_city_only
        && let (Some(lat), Some(lon)) = (profile.latitude, profile.longitude)
    {
        let radius = profile
            .notification_radius_miles
            .filter(|r| *r > 0.0)
            .unwrap_or(default_radius_miles);

        return LocationScope::Geographic {
            origin: Point::new(lat, lon),
            radius_miles: radius,
        };
    }

    if let Some(city) = profile.city.as_deref().filter(|c| !c.trim().is_empty()) {
        return LocationScope::City {
            city: city.to_string(),
            state: profile.state.clone(),
        };
    }

    LocationScope::Unfiltered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            id: 1,
            first_name: "Jordan".to_string(),
            last_name: "Lee".to_string(),
            profile_image: None,
            latitude: Some(30.2672),
            longitude: Some(-97.7431),
            city: Some("Austin".to_string()),
            state: Some("Texas".to_string()),
            notification_radius_miles: Some(25.0),
            show_city_only: false,
            is_active: true,
        }
    }

    #[test]
    fn test_geographic_mode_with_coordinates() {
        let scope = resolve_location(&profile(), 10.0);
        assert_eq!(
            scope,
            LocationScope::Geographic {
                origin: Point::new(30.2672, -97.7431),
                radius_miles: 25.0,
            }
        );
    }

    #[test]
    fn test_default_radius_when_unset_or_non_positive() {
        let mut p = profile();
        p.notification_radius_miles = None;
        assert!(matches!(
            resolve_location(&p, 10.0),
            LocationScope::Geographic { radius_miles, .. } if radius_miles == 10.0
        ));

        p.notification_radius_miles = Some(0.0);
        assert!(matches!(
            resolve_location(&p, 10.0),
            LocationScope::Geographic { radius_miles, .. } if radius_miles == 10.0
        ));
    }

    #[test]
    fn test_show_city_only_forces_city_mode() {
        let mut p = profile();
        p.show_city_only = true;
        assert_eq!(
            resolve_location(&p, 10.0),
            LocationScope::City {
                city: "Austin".to_string(),
                state: Some("Texas".to_string()),
            }
        );
    }

    #[test]
    fn test_missing_coordinates_fall_back_to_city() {
        let mut p = profile();
        p.latitude = None;
        assert!(matches!(
            resolve_location(&p, 10.0),
            LocationScope::City { .. }
        ));
    }

    #[test]
    fn test_no_location_at_all_is_unfiltered() {
        let mut p = profile();
        p.latitude = None;
        p.longitude = None;
        p.city = None;
        assert_eq!(resolve_location(&p, 10.0), LocationScope::Unfiltered);

        p.city = Some("   ".to_string());
        assert_eq!(resolve_location(&p, 10.0), LocationScope::Unfiltered);
    }
}
