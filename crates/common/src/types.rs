use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity block served on `/info` so the dashboard can tell which service
/// instance answered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub instance_id: Uuid,
}

impl ServiceInfo {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            instance_id: Uuid::new_v4(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instances_get_distinct_ids() {
        let a = ServiceInfo::new("shopsync-api");
        let b = ServiceInfo::new("shopsync-api");
        assert_eq!(a.name, b.name);
        assert_ne!(a.instance_id, b.instance_id);
    }
}
