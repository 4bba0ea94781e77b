use crate::db::MediaStore;
use crate::error::Result;
use crate::models::{MediaItem, Month, Season};
use crate::selection::{ActionBar, Selection};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Seasons,
    Months,
    Gallery,
}

#[derive(Debug, Clone, Serialize)]
pub struct Folder {
    pub name: String,
    pub count: i64,
}

/// What the current view shows after a refresh.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum ViewModel {
    Seasons {
        folders: Vec<Folder>,
    },
    Months {
        season: Season,
        folders: Vec<Folder>,
    },
    Gallery {
        season: Season,
        month: Month,
        items: Vec<MediaItem>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crumb {
    Home,
    Season(Season),
    Month(Month),
}

/// Navigation depth, the folder being looked at, and the user's selection.
#[derive(Debug, Clone)]
pub struct GalleryState {
    view: View,
    active_season: Option<Season>,
    active_month: Option<Month>,
    selection: Selection,
    // ids rendered by the last gallery refresh
    displayed: BTreeSet<i64>,
}

impl Default for GalleryState {
    fn default() -> Self {
        Self {
            view: View::Seasons,
            active_season: None,
            active_month: None,
            selection: Selection::new(),
            displayed: BTreeSet::new(),
        }
    }
}

impl GalleryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn active_season(&self) -> Option<Season> {
        self.active_season
    }

    pub fn active_month(&self) -> Option<Month> {
        self.active_month
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn displayed(&self) -> &BTreeSet<i64> {
        &self.displayed
    }

    pub fn action_bar(&self) -> ActionBar {
        self.selection.action_bar()
    }

    pub fn enter_seasons(&mut self) {
        self.view = View::Seasons;
        self.active_season = None;
        self.active_month = None;
        self.reset_selection();
    }

    pub fn enter_months(&mut self, season: Season) {
        self.view = View::Months;
        self.active_season = Some(season);
        self.active_month = None;
        self.reset_selection();
    }

    /// The season is taken from the month, so the pair stays consistent
    /// however the gallery was reached.
    pub fn enter_gallery(&mut self, month: Month) {
        self.view = View::Gallery;
        self.active_season = Some(month.season());
        self.active_month = Some(month);
        self.reset_selection();
    }

    fn reset_selection(&mut self) {
        self.selection.clear();
        self.displayed.clear();
    }

    /// Select or unselect an item of the open gallery. Ids that are not on
    /// screen are ignored and report false.
    pub fn toggle_selection(&mut self, id: i64) -> bool {
        if self.view != View::Gallery || !self.displayed.contains(&id) {
            tracing::debug!(id, "ignoring toggle for item not on screen");
            return false;
        }
        self.selection.toggle(id)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Re-read whatever the current view shows. Called after every mutation.
    pub async fn refresh_current_view(&mut self, store: &MediaStore) -> Result<ViewModel> {
        match (self.view, self.active_season, self.active_month) {
            (View::Gallery, _, Some(month)) => {
                let items = store.query_by_month(month).await?;
                self.displayed = items.iter().map(|item| item.id).collect();
                self.selection.retain(&self.displayed);
                Ok(ViewModel::Gallery {
                    season: month.season(),
                    month,
                    items,
                })
            }
            (View::Months, Some(season), _) => {
                self.displayed.clear();
                let mut folders = Vec::with_capacity(3);
                for month in season.months() {
                    folders.push(Folder {
                        name: month.to_string(),
                        count: store.count_by_month(month).await?,
                    });
                }
                Ok(ViewModel::Months { season, folders })
            }
            _ => {
                // Seasons. A deeper view without its folder lists seasons too
                // but keeps its navigation state.
                self.displayed.clear();
                self.selection.retain(&self.displayed);
                let mut folders = Vec::with_capacity(Season::ALL.len());
                for season in Season::ALL {
                    folders.push(Folder {
                        name: season.to_string(),
                        count: store.count_by_season(season).await?,
                    });
                }
                Ok(ViewModel::Seasons { folders })
            }
        }
    }

    pub fn breadcrumbs(&self) -> Vec<Crumb> {
        let mut crumbs = vec![Crumb::Home];
        if let Some(season) = self.active_season {
            crumbs.push(Crumb::Season(season));
        }
        if let Some(month) = self.active_month {
            crumbs.push(Crumb::Month(month));
        }
        crumbs
    }
}
