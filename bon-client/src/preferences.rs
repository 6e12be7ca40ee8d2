//! Device preferences: display language and per-screen branch selection

use std::fmt;

use crate::ClientResult;
use crate::storage::{SharedStore, keys};

/// UI language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    En,
    Ar,
}

/// Text direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl TextDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextDirection::Ltr => "ltr",
            TextDirection::Rtl => "rtl",
        }
    }
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Language::En),
            "ar" => Some(Language::Ar),
            _ => None,
        }
    }

    pub fn direction(&self) -> TextDirection {
        match self {
            Language::Ar => TextDirection::Rtl,
            Language::En => TextDirection::Ltr,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Staff screens that remember their branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Cashier,
    Queue,
    AdminOrders,
    Kitchen,
}

impl Screen {
    pub fn storage_key(&self) -> &'static str {
        match self {
            Screen::Cashier => keys::CASHIER_INSTITUTION,
            Screen::Queue => keys::QUEUE_INSTITUTION,
            Screen::AdminOrders => keys::ADMIN_ORDERS_INSTITUTION,
            Screen::Kitchen => keys::KITCHEN_INSTITUTION,
        }
    }
}

/// Branch chosen for one screen; `None` means the picker must be shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchSelection {
    pub screen: Screen,
    pub institution_id: Option<String>,
}

impl BranchSelection {
    pub fn is_selected(&self) -> bool {
        self.institution_id.is_some()
    }
}

pub struct Preferences {
    store: SharedStore,
}

impl Preferences {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Saved language; anything unrecognised reads as English
    pub fn language(&self) -> Language {
        match self.store.get(keys::LANGUAGE) {
            Ok(Some(code)) => Language::from_code(&code).unwrap_or_default(),
            Ok(None) => Language::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read language preference");
                Language::default()
            }
        }
    }

    pub fn set_language(&self, language: Language) -> ClientResult<()> {
        self.store.set(keys::LANGUAGE, language.code())?;
        tracing::debug!(language = %language, "Language changed");
        Ok(())
    }

    pub fn branch(&self, screen: Screen) -> BranchSelection {
        let institution_id = match self.store.get(screen.storage_key()) {
            Ok(id) => id.filter(|id| !id.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, ?screen, "Failed to read branch selection");
                None
            }
        };
        BranchSelection {
            screen,
            institution_id,
        }
    }

    pub fn select_branch(&self, screen: Screen, institution_id: &str) -> ClientResult<()> {
        self.store.set(screen.storage_key(), institution_id)?;
        tracing::info!(?screen, institution_id = %institution_id, "Branch selected");
        Ok(())
    }

    pub fn clear_branch(&self, screen: Screen) -> ClientResult<()> {
        self.store.remove(screen.storage_key())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_language_roundtrip_and_fallback() {
        let store = MemoryStore::shared();
        let prefs = Preferences::new(store.clone());
        assert_eq!(prefs.language(), Language::En);

        prefs.set_language(Language::Ar).unwrap();
        assert_eq!(prefs.language(), Language::Ar);
        assert_eq!(prefs.language().direction(), TextDirection::Rtl);
        assert_eq!(store.get(keys::LANGUAGE).unwrap().as_deref(), Some("ar"));

        store.set(keys::LANGUAGE, "fr").unwrap();
        assert_eq!(prefs.language(), Language::En);
    }

    #[test]
    fn test_branch_selection_per_screen() {
        let store = MemoryStore::shared();
        let prefs = Preferences::new(store.clone());

        assert!(!prefs.branch(Screen::Cashier).is_selected());
        prefs.select_branch(Screen::Cashier, "inst-1").unwrap();

        assert_eq!(
            prefs.branch(Screen::Cashier).institution_id.as_deref(),
            Some("inst-1")
        );
        assert!(!prefs.branch(Screen::Queue).is_selected());
        assert_eq!(
            store.get("cashier_instId").unwrap().as_deref(),
            Some("inst-1")
        );

        prefs.clear_branch(Screen::Cashier).unwrap();
        assert!(!prefs.branch(Screen::Cashier).is_selected());
    }
}
