use serde::Serialize;

use super::domain::{Coordinates, Manufacturer};

/// Pin rendered by the map widget; `slug` links the pin to the matching directory card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub slug: String,
    pub name: String,
    pub location: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub logo_url: Option<String>,
    pub model_count: usize,
}

impl MapMarker {
    pub fn new(manufacturer: &Manufacturer, model_count: usize) -> Option<Self> {
        let Coordinates {
            latitude,
            longitude,
        } = manufacturer.coordinates?;

        Some(Self {
            slug: manufacturer.slug.clone(),
            name: manufacturer.name.clone(),
            location: manufacturer.location.clone(),
            latitude,
            longitude,
            logo_url: manufacturer.logo_url.clone(),
            model_count,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub markers: Vec<MapMarker>,
    pub bounds: Option<MapBounds>,
    pub center: Option<Coordinates>,
}

impl MapView {
    pub fn from_markers(markers: Vec<MapMarker>) -> Self {
        let bounds = bounds_of(&markers);
        let center = bounds.map(|bounds| Coordinates {
            latitude: (bounds.north + bounds.south) / 2.0,
            longitude: (bounds.east + bounds.west) / 2.0,
        });

        Self {
            markers,
            bounds,
            center,
        }
    }
}

fn bounds_of(markers: &[MapMarker]) -> Option<MapBounds> {
    let first = markers.first()?;
    let initial = MapBounds {
        north: first.latitude,
        south: first.latitude,
        east: first.longitude,
        west: first.longitude,
    };

    Some(markers.iter().skip(1).fold(initial, |bounds, marker| MapBounds {
        north: bounds.north.max(marker.latitude),
        south: bounds.south.min(marker.latitude),
        east: bounds.east.max(marker.longitude),
        west: bounds.west.min(marker.longitude),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(slug: &str, latitude: f64, longitude: f64) -> MapMarker {
        MapMarker {
            slug: slug.to_string(),
            name: slug.to_string(),
            location: None,
            latitude,
            longitude,
            logo_url: None,
            model_count: 0,
        }
    }

    #[test]
    fn empty_view_has_no_bounds() {
        let view = MapView::from_markers(Vec::new());
        assert!(view.bounds.is_none());
        assert!(view.center.is_none());
    }

    #[test]
    fn bounds_cover_every_marker() {
        let view = MapView::from_markers(vec![
            marker("bend", 44.05, -121.31),
            marker("boise", 43.61, -116.2),
            marker("spokane", 47.65, -117.42),
        ]);
        let bounds = view.bounds.expect("bounds computed");
        assert_eq!(bounds.north, 47.65);
        assert_eq!(bounds.south, 43.61);
        assert_eq!(bounds.east, -116.2);
        assert_eq!(bounds.west, -121.31);

        let center = view.center.expect("center computed");
        assert!((center.latitude - 45.63).abs() < 1e-9);
        assert!((center.longitude - -118.755).abs() < 1e-9);
    }
}
