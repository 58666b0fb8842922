use crate::domain::sharepoint::{Column, SpList, mappable_columns};
use crate::workflow::LoadStatus;

/// The chosen site and what is known about its lists.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteSelection {
    pub site_id: String,
    pub lists: Vec<SpList>,
    pub lists_status: LoadStatus,
}

/// Site -> list -> columns. Every transition drops whatever hung off the
/// level it replaces.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Destination {
    #[default]
    NoSite,
    SiteChosen(SiteSelection),
    ListChosen {
        site: SiteSelection,
        list_id: String,
        columns_status: LoadStatus,
    },
    ColumnsLoaded {
        site: SiteSelection,
        list_id: String,
        /// Already filtered down to mappable columns.
        columns: Vec<Column>,
    },
}

impl Destination {
    fn site(&self) -> Option<&SiteSelection> {
        match self {
            Destination::NoSite => None,
            Destination::SiteChosen(site)
            | Destination::ListChosen { site, .. }
            | Destination::ColumnsLoaded { site, .. } => Some(site),
        }
    }

    fn site_mut(&mut self) -> Option<&mut SiteSelection> {
        match self {
            Destination::NoSite => None,
            Destination::SiteChosen(site)
            | Destination::ListChosen { site, .. }
            | Destination::ColumnsLoaded { site, .. } => Some(site),
        }
    }

    pub fn site_id(&self) -> Option<&str> {
        self.site().map(|s| s.site_id.as_str())
    }

    pub fn list_id(&self) -> Option<&str> {
        match self {
            Destination::ListChosen { list_id, .. } | Destination::ColumnsLoaded { list_id, .. } => {
                Some(list_id)
            }
            _ => None,
        }
    }

    pub fn lists(&self) -> &[SpList] {
        self.site().map(|s| s.lists.as_slice()).unwrap_or_default()
    }

    pub fn lists_status(&self) -> LoadStatus {
        self.site()
            .map(|s| s.lists_status.clone())
            .unwrap_or_default()
    }

    pub fn columns(&self) -> &[Column] {
        match self {
            Destination::ColumnsLoaded { columns, .. } => columns,
            _ => &[],
        }
    }

    pub fn columns_status(&self) -> LoadStatus {
        match self {
            Destination::ListChosen { columns_status, .. } => columns_status.clone(),
            Destination::ColumnsLoaded { .. } => LoadStatus::Ready,
            _ => LoadStatus::Idle,
        }
    }

    /// Choose a site. Returns true when its lists need fetching; an empty id
    /// goes back to `NoSite`.
    pub fn choose_site(&mut self, site_id: &str) -> bool {
        if site_id.is_empty() {
            *self = Destination::NoSite;
            return false;
        }
        *self = Destination::SiteChosen(SiteSelection {
            site_id: site_id.to_string(),
            lists: Vec::new(),
            lists_status: LoadStatus::Loading,
        });
        true
    }

    /// Choose a list of the current site. Returns true when its columns need
    /// fetching; an empty id goes back to `SiteChosen`.
    pub fn choose_list(&mut self, list_id: &str) -> bool {
        let Some(site) = self.site().cloned() else {
            return false;
        };
        if list_id.is_empty() {
            *self = Destination::SiteChosen(site);
            return false;
        }
        *self = Destination::ListChosen {
            site,
            list_id: list_id.to_string(),
            columns_status: LoadStatus::Loading,
        };
        true
    }

    /// Apply a lists fetch. Arrivals for a site that is no longer chosen are dropped.
    pub fn lists_arrived(&mut self, site_id: &str, result: Result<Vec<SpList>, String>) -> bool {
        let Some(site) = self.site_mut().filter(|s| s.site_id == site_id) else {
            log::debug!("dropping lists for superseded site {site_id}");
            return false;
        };
        match result {
            Ok(lists) => {
                site.lists = lists;
                site.lists_status = LoadStatus::Ready;
            }
            Err(e) => {
                site.lists.clear();
                site.lists_status = LoadStatus::Failed(e);
            }
        }
        true
    }

    /// Apply a columns fetch. Arrivals for another site or list are dropped.
    pub fn columns_arrived(
        &mut self,
        site_id: &str,
        list_id: &str,
        result: Result<Vec<Column>, String>,
    ) -> bool {
        let matches = self.site_id() == Some(site_id) && self.list_id() == Some(list_id);
        if !matches {
            log::debug!("dropping columns for superseded list {site_id}/{list_id}");
            return false;
        }
        let (site, list_id) = match std::mem::take(self) {
            Destination::ListChosen { site, list_id, .. }
            | Destination::ColumnsLoaded { site, list_id, .. } => (site, list_id),
            other => {
                *self = other;
                return false;
            }
        };
        *self = match result {
            Ok(columns) => Destination::ColumnsLoaded {
                site,
                list_id,
                columns: mappable_columns(columns),
            },
            Err(e) => Destination::ListChosen {
                site,
                list_id,
                columns_status: LoadStatus::Failed(e),
            },
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(id: &str) -> SpList {
        SpList {
            id: id.into(),
            display_name: Some(id.to_uppercase()),
            name: None,
        }
    }

    fn column(name: &str, hidden: bool) -> Column {
        Column {
            id: name.into(),
            name: name.into(),
            display_name: None,
            hidden,
            read_only: false,
        }
    }

    fn loaded() -> Destination {
        let mut d = Destination::default();
        assert!(d.choose_site("s1"));
        assert!(d.lists_arrived("s1", Ok(vec![list("l1"), list("l2")])));
        assert!(d.choose_list("l1"));
        assert!(d.columns_arrived("s1", "l1", Ok(vec![column("Title", false)])));
        d
    }

    #[test]
    fn walks_through_all_states() {
        let d = loaded();
        assert_eq!(d.site_id(), Some("s1"));
        assert_eq!(d.list_id(), Some("l1"));
        assert_eq!(d.lists().len(), 2);
        assert_eq!(d.columns().len(), 1);
        assert_eq!(d.columns_status(), LoadStatus::Ready);
    }

    #[test]
    fn new_site_clears_list_and_columns() {
        let mut d = loaded();
        assert!(d.choose_site("s2"));
        assert_eq!(d.list_id(), None);
        assert!(d.lists().is_empty());
        assert!(d.columns().is_empty());
        assert_eq!(d.lists_status(), LoadStatus::Loading);
    }

    #[test]
    fn new_list_clears_columns_but_keeps_lists() {
        let mut d = loaded();
        assert!(d.choose_list("l2"));
        assert!(d.columns().is_empty());
        assert_eq!(d.lists().len(), 2);
        assert_eq!(d.columns_status(), LoadStatus::Loading);
    }

    #[test]
    fn empty_ids_step_back() {
        let mut d = loaded();
        assert!(!d.choose_list(""));
        assert!(matches!(d, Destination::SiteChosen(_)));
        assert!(!d.choose_site(""));
        assert_eq!(d, Destination::NoSite);
        assert!(!d.choose_list("l1"));
        assert_eq!(d, Destination::NoSite);
    }

    #[test]
    fn late_arrivals_for_old_site_are_dropped() {
        let mut d = Destination::default();
        d.choose_site("s1");
        d.choose_site("s2");
        assert!(!d.lists_arrived("s1", Ok(vec![list("old")])));
        assert!(d.lists().is_empty());
        assert!(d.lists_arrived("s2", Ok(vec![list("new")])));
        assert_eq!(d.lists()[0].id, "new");
    }

    #[test]
    fn late_columns_for_old_list_are_dropped() {
        let mut d = Destination::default();
        d.choose_site("s1");
        d.choose_list("l1");
        d.choose_list("l2");
        assert!(!d.columns_arrived("s1", "l1", Ok(vec![column("Old", false)])));
        assert!(d.columns().is_empty());
        assert!(d.columns_arrived("s1", "l2", Ok(vec![column("New", false), column("Hid", true)])));
        assert_eq!(d.columns().len(), 1);
    }

    #[test]
    fn failed_column_fetch_is_visible() {
        let mut d = Destination::default();
        d.choose_site("s1");
        d.choose_list("l1");
        d.columns_arrived("s1", "l1", Err("403".into()));
        assert_eq!(d.columns_status(), LoadStatus::Failed("403".into()));
        assert_eq!(d.list_id(), Some("l1"));
    }
}
