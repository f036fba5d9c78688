//! Named, ordered groups of timers.
//!
//! Dashboards only hold timer ids; the engine knows nothing about them and
//! exposes no dashboard-aware operations. When a timer is deleted, callers
//! reconcile by pruning the id from every dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::storage::Database;
use crate::timer::TimerId;

const DASHBOARDS_KEY: &str = "dashboards";

/// One named group of timers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub id: Uuid,
    pub name: String,
    /// Display order of member timers.
    pub timer_ids: Vec<TimerId>,
    pub created_at: DateTime<Utc>,
}

/// The persisted dashboard collection.
pub struct Dashboards {
    db: Database,
    items: Vec<Dashboard>,
}

impl Dashboards {
    /// Load every dashboard from the database.
    pub fn load(db: Database) -> Result<Self> {
        let items = match db.kv_get(DASHBOARDS_KEY)? {
            Some(json) => serde_json::from_str(&json)?,
            None => Vec::new(),
        };
        Ok(Self { db, items })
    }

    pub fn all(&self) -> &[Dashboard] {
        &self.items
    }

    /// Look a dashboard up by uuid or by exact name.
    pub fn find(&self, name_or_id: &str) -> Option<&Dashboard> {
        if let Ok(id) = Uuid::parse_str(name_or_id) {
            return self.items.iter().find(|d| d.id == id);
        }
        self.items.iter().find(|d| d.name == name_or_id)
    }

    pub fn create(&mut self, name: &str) -> Result<Dashboard> {
        if name.is_empty() {
            return Err(crate::error::ValidationError::InvalidValue {
                field: "name".into(),
                message: "dashboard name must not be empty".into(),
            }
            .into());
        }
        if self.find(name).is_some() {
            return Err(crate::error::ValidationError::InvalidValue {
                field: "name".into(),
                message: format!("dashboard '{name}' already exists"),
            }
            .into());
        }
        let dashboard = Dashboard {
            id: Uuid::new_v4(),
            name: name.to_string(),
            timer_ids: Vec::new(),
            created_at: Utc::now(),
        };
        self.items.push(dashboard.clone());
        self.save()?;
        Ok(dashboard)
    }

    /// Append a timer id; already-present ids keep their position.
    pub fn add_timer(&mut self, name_or_id: &str, timer_id: TimerId) -> Result<()> {
        let dashboard = self
            .find_mut(name_or_id)
            .ok_or_else(|| CoreError::DashboardNotFound(name_or_id.to_string()))?;
        if !dashboard.timer_ids.contains(&timer_id) {
            dashboard.timer_ids.push(timer_id);
        }
        self.save()
    }

    /// Returns false when the timer was not a member.
    pub fn remove_timer(&mut self, name_or_id: &str, timer_id: TimerId) -> Result<bool> {
        let dashboard = self
            .find_mut(name_or_id)
            .ok_or_else(|| CoreError::DashboardNotFound(name_or_id.to_string()))?;
        let before = dashboard.timer_ids.len();
        dashboard.timer_ids.retain(|id| *id != timer_id);
        let removed = dashboard.timer_ids.len() != before;
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    /// Drop a deleted timer's id from every dashboard; returns how many
    /// dashboards referenced it.
    pub fn remove_timer_everywhere(&mut self, timer_id: TimerId) -> Result<usize> {
        let mut touched = 0;
        for dashboard in &mut self.items {
            let before = dashboard.timer_ids.len();
            dashboard.timer_ids.retain(|id| *id != timer_id);
            if dashboard.timer_ids.len() != before {
                touched += 1;
            }
        }
        if touched > 0 {
            self.save()?;
        }
        Ok(touched)
    }

    /// Delete a dashboard; member timers are untouched.
    pub fn delete(&mut self, name_or_id: &str) -> Result<bool> {
        let Some(id) = self.find(name_or_id).map(|d| d.id) else {
            return Ok(false);
        };
        self.items.retain(|d| d.id != id);
        self.save()?;
        Ok(true)
    }

    fn find_mut(&mut self, name_or_id: &str) -> Option<&mut Dashboard> {
        if let Ok(id) = Uuid::parse_str(name_or_id) {
            return self.items.iter_mut().find(|d| d.id == id);
        }
        self.items.iter_mut().find(|d| d.name == name_or_id)
    }

    fn save(&self) -> Result<()> {
        let json = serde_json::to_string(&self.items)?;
        self.db.kv_set(DASHBOARDS_KEY, &json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty() -> Dashboards {
        Dashboards::load(Database::open_memory().unwrap()).unwrap()
    }

    #[test]
    fn create_find_delete() {
        let mut dashboards = empty();
        let kitchen = dashboards.create("kitchen").unwrap();
        assert_eq!(dashboards.all().len(), 1);
        assert_eq!(dashboards.find("kitchen").unwrap().id, kitchen.id);
        assert_eq!(
            dashboards.find(&kitchen.id.to_string()).unwrap().name,
            "kitchen"
        );

        assert!(dashboards.delete("kitchen").unwrap());
        assert!(dashboards.find("kitchen").is_none());
        assert!(!dashboards.delete("kitchen").unwrap());
    }

    #[test]
    fn duplicate_and_empty_names_rejected() {
        let mut dashboards = empty();
        dashboards.create("kitchen").unwrap();
        assert!(dashboards.create("kitchen").is_err());
        assert!(dashboards.create("").is_err());
    }

    #[test]
    fn membership_keeps_order_and_dedupes() {
        let mut dashboards = empty();
        dashboards.create("kitchen").unwrap();
        dashboards.add_timer("kitchen", 3).unwrap();
        dashboards.add_timer("kitchen", 1).unwrap();
        dashboards.add_timer("kitchen", 3).unwrap();
        assert_eq!(dashboards.find("kitchen").unwrap().timer_ids, vec![3, 1]);

        assert!(dashboards.remove_timer("kitchen", 3).unwrap());
        assert!(!dashboards.remove_timer("kitchen", 3).unwrap());
        assert_eq!(dashboards.find("kitchen").unwrap().timer_ids, vec![1]);
    }

    #[test]
    fn missing_dashboard_is_an_error() {
        let mut dashboards = empty();
        assert!(matches!(
            dashboards.add_timer("nope", 1),
            Err(CoreError::DashboardNotFound(_))
        ));
    }

    #[test]
    fn deleted_timer_is_pruned_everywhere() {
        let mut dashboards = empty();
        dashboards.create("kitchen").unwrap();
        dashboards.create("office").unwrap();
        dashboards.add_timer("kitchen", 7).unwrap();
        dashboards.add_timer("office", 7).unwrap();
        dashboards.add_timer("office", 8).unwrap();

        assert_eq!(dashboards.remove_timer_everywhere(7).unwrap(), 2);
        assert!(dashboards.find("kitchen").unwrap().timer_ids.is_empty());
        assert_eq!(dashboards.find("office").unwrap().timer_ids, vec![8]);
        assert_eq!(dashboards.remove_timer_everywhere(7).unwrap(), 0);
    }
}
