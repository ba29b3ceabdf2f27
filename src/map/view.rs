//! Web Mercator view: maps between window pixels and geographic coordinates.
//!
//! Screen coordinates are logical window pixels with the origin at the top-left
//! and y growing downward, as reported by bevy's cursor and touch events.

use bevy::math::DVec2;
use bevy::prelude::*;
use std::f64::consts::PI;

use crate::drawing::LatLng;

/// Size of one map tile at zoom 0
pub const TILE_SIZE: f64 = 256.0;

/// Latitude limit of the square Web Mercator world
pub const MAX_LATITUDE: f64 = 85.051_128_78;

pub const MIN_ZOOM: f64 = 3.0;
pub const MAX_ZOOM: f64 = 21.0;

/// Meters per pixel at the equator for zoom 0
const EQUATOR_METERS_PER_PIXEL: f64 = 156_543.033_92;

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct MapView {
    pub center: LatLng,
    pub zoom: f64,
    /// Window size in logical pixels
    pub viewport: Vec2,
}

impl MapView {
    pub fn new(center: LatLng, zoom: f64, viewport: Vec2) -> Self {
        Self {
            center: clamp_latlng(center),
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            viewport,
        }
    }

    fn world_size(&self) -> f64 {
        TILE_SIZE * 2f64.powf(self.zoom)
    }

    fn half_viewport(&self) -> DVec2 {
        self.viewport.as_dvec2() * 0.5
    }

    pub fn screen_to_latlng(&self, screen: Vec2) -> LatLng {
        let size = self.world_size();
        let center = project(self.center, size);
        unproject(center + screen.as_dvec2() - self.half_viewport(), size)
    }

    pub fn latlng_to_screen(&self, position: LatLng) -> Vec2 {
        let size = self.world_size();
        let center = project(self.center, size);
        let mut offset = project(position, size) - center;
        // Take the short way around the antimeridian
        if offset.x > size / 2.0 {
            offset.x -= size;
        } else if offset.x < -size / 2.0 {
            offset.x += size;
        }
        (offset + self.half_viewport()).as_vec2()
    }

    /// Convert a screen position to bevy 2D world space (origin at the
    /// window center, y up).
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        Vec2::new(
            screen.x - self.viewport.x / 2.0,
            self.viewport.y / 2.0 - screen.y,
        )
    }

    /// Move the map so the content follows a pointer drag of `delta` pixels.
    pub fn pan_by(&mut self, delta: Vec2) {
        let size = self.world_size();
        let center = project(self.center, size) - delta.as_dvec2();
        self.center = clamp_latlng(unproject(center, size));
    }

    /// Change zoom, keeping the point under `anchor` (screen px) fixed.
    pub fn zoom_around(&mut self, anchor: Vec2, zoom: f64) {
        let zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        if zoom == self.zoom {
            return;
        }
        let fixed = self.screen_to_latlng(anchor);
        self.zoom = zoom;
        let drifted = self.latlng_to_screen(fixed);
        self.pan_by(anchor - drifted);
    }

    pub fn center_on(&mut self, position: LatLng) {
        self.center = clamp_latlng(position);
    }

    /// Ground resolution at the view center.
    pub fn meters_per_pixel(&self) -> f64 {
        EQUATOR_METERS_PER_PIXEL * self.center.lat.to_radians().cos() / 2f64.powf(self.zoom)
    }
}

fn clamp_latlng(position: LatLng) -> LatLng {
    LatLng::new(
        position.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE),
        (position.lng + 180.0).rem_euclid(360.0) - 180.0,
    )
}

/// Global pixel coordinates of `position` in a world `size` pixels wide.
fn project(position: LatLng, size: f64) -> DVec2 {
    let lat = position.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let sin = lat.sin();
    let x = (position.lng + 180.0) / 360.0;
    let y = 0.5 - ((1.0 + sin) / (1.0 - sin)).ln() / (4.0 * PI);
    DVec2::new(x * size, y * size)
}

fn unproject(pixel: DVec2, size: f64) -> LatLng {
    let lng = pixel.x / size * 360.0 - 180.0;
    let n = PI - 2.0 * PI * pixel.y / size;
    let lat = n.sinh().atan().to_degrees();
    LatLng::new(lat, (lng + 180.0).rem_euclid(360.0) - 180.0)
}
