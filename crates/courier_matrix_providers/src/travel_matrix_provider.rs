use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, JsonSchema, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TravelMatrixProvider {
    /// Ellipsoidal distances computed locally
    Geodesic,

    /// http://project-osrm.org/docs/v5.24.0/api/#table-service
    OsrmTable,
}
