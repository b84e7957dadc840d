use std::sync::{Arc, OnceLock};

use lanprobe_common::network::vendor::{StaticVendors, VendorRepository};
use mac_oui::Oui;
use pnet::util::MacAddr;
use tracing::warn;

static OUI_DB: OnceLock<Option<Oui>> = OnceLock::new();

/// Retrieves or initializes the **Organizationally unique identifier** database.
///
/// A database that fails to load is reported once and then treated as empty.
fn get_oui_db() -> Option<&'static Oui> {
    OUI_DB
        .get_or_init(|| match Oui::default() {
            Ok(db) => Some(db),
            Err(e) => {
                warn!("failed to load OUI database: {e}");
                None
            }
        })
        .as_ref()
}

/// The bundled IEEE registry.
pub struct MacOuiRepo;

impl VendorRepository for MacOuiRepo {
    fn get_vendor(&self, mac: MacAddr) -> Option<String> {
        let db = get_oui_db()?;
        let mac_str = mac.to_string();
        match db.lookup_by_mac(&mac_str) {
            Ok(Some(entry)) => Some(entry.company_name.clone()),
            _ => None,
        }
    }
}

/// Asks each repository in order and returns the first answer.
pub struct LayeredVendors {
    layers: Vec<Box<dyn VendorRepository>>,
}

impl LayeredVendors {
    pub fn new(layers: Vec<Box<dyn VendorRepository>>) -> Self {
        Self { layers }
    }
}

impl VendorRepository for LayeredVendors {
    fn get_vendor(&self, mac: MacAddr) -> Option<String> {
        self.layers.iter().find_map(|layer| layer.get_vendor(mac))
    }
}

/// Curated prefixes first, then the full registry.
pub fn default_repository() -> Arc<dyn VendorRepository> {
    Arc::new(LayeredVendors::new(vec![
        Box::new(StaticVendors),
        Box::new(MacOuiRepo),
    ]))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str);

    impl VendorRepository for Fixed {
        fn get_vendor(&self, _mac: MacAddr) -> Option<String> {
            Some(self.0.to_string())
        }
    }

    #[test]
    fn static_table_shadows_later_layers() {
        let repo = LayeredVendors::new(vec![Box::new(StaticVendors), Box::new(Fixed("Registry"))]);
        let yealink = MacAddr::new(0xa0, 0xb1, 0xc2, 0, 0, 1);
        let other = MacAddr::new(0x02, 0, 0, 0, 0, 1);

        assert_eq!(repo.get_vendor(yealink).as_deref(), Some("Yealink VoIP"));
        assert_eq!(repo.get_vendor(other).as_deref(), Some("Registry"));
    }

    #[test]
    fn empty_stack_knows_nothing() {
        let repo = LayeredVendors::new(Vec::new());
        assert_eq!(repo.get_vendor(MacAddr::new(0, 1, 2, 3, 4, 5)), None);
    }

    #[test]
    fn registry_knows_a_well_known_prefix() {
        let vendor = MacOuiRepo.get_vendor(MacAddr::new(0x00, 0x03, 0x93, 0x12, 0x34, 0x56));
        assert!(vendor.is_some_and(|v| v.to_lowercase().contains("apple")));
    }
}
