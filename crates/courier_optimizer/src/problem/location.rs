use crate::error::ValidationError;

/// A geographic point with the cash and parcel quantity attached to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    point: geo::Point,
    cod: f64,
    parcels: f64,
}

impl Location {
    pub fn from_lat_lon(lat: f64, lon: f64) -> Self {
        Self {
            point: geo::Point::new(lon, lat),
            cod: 0.0,
            parcels: 1.0,
        }
    }

    pub fn with_cod(mut self, cod: f64) -> Self {
        self.cod = cod;
        self
    }

    pub fn with_parcels(mut self, parcels: f64) -> Self {
        self.parcels = parcels;
        self
    }

    pub fn lat(&self) -> f64 {
        self.point.y()
    }

    pub fn lon(&self) -> f64 {
        self.point.x()
    }

    pub fn lat_lon(&self) -> [f64; 2] {
        [self.lat(), self.lon()]
    }

    pub fn point(&self) -> geo::Point {
        self.point
    }

    pub fn cod(&self) -> f64 {
        self.cod
    }

    pub fn parcels(&self) -> f64 {
        self.parcels
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let (lat, lon) = (self.lat(), self.lon());
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(ValidationError::InvalidLocation(format!(
                "latitude {lat} out of range"
            )));
        }

        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(ValidationError::InvalidLocation(format!(
                "longitude {lon} out of range"
            )));
        }

        if !self.cod.is_finite() || self.cod < 0.0 {
            return Err(ValidationError::Negative("cod"));
        }

        if !self.parcels.is_finite() || self.parcels < 0.0 {
            return Err(ValidationError::Negative("parcels"));
        }

        Ok(())
    }
}

impl From<&Location> for geo::Point<f64> {
    fn from(location: &Location) -> Self {
        location.point
    }
}
