//! Connection address and display name extraction

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};

/// A host contributed by one resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostEntry {
    /// Connection address (IPv4 or hostname)
    pub address: String,
    /// Display name
    pub hostname: String,
}

/// Attribute keys consulted when extracting a host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressExtractor {
    /// Element 0 of the guest address list, preferred when non-empty
    pub list_key: String,
    /// Single default address, used as fallback
    pub default_key: String,
    /// Display name
    pub name_key: String,
}

impl Default for AddressExtractor {
    fn default() -> Self {
        Self {
            list_key: "guest_ip_addresses.0".to_string(),
            default_key: "default_ip_address".to_string(),
            name_key: "name".to_string(),
        }
    }
}

impl AddressExtractor {
    /// Extract the address and display name from a resource's attributes
    ///
    /// `resource` and `group` only feed the error context.
    ///
    /// # Errors
    /// Returns `MissingAddress` when neither address attribute is set and
    /// `MissingName` when the name attribute is empty.
    pub fn extract(
        &self,
        attributes: &BTreeMap<String, String>,
        resource: &str,
        group: &str,
    ) -> Result<HostEntry> {
        let non_empty = |key: &str| {
            attributes
                .get(key)
                .map(String::as_str)
                .filter(|v| !v.is_empty())
        };

        let address = non_empty(&self.list_key)
            .or_else(|| non_empty(&self.default_key))
            .ok_or_else(|| ConvertError::MissingAddress {
                resource: resource.to_string(),
                group: group.to_string(),
                list_key: self.list_key.clone(),
                default_key: self.default_key.clone(),
            })?;

        let hostname = non_empty(&self.name_key).ok_or_else(|| ConvertError::MissingName {
            resource: resource.to_string(),
            group: group.to_string(),
            name_key: self.name_key.clone(),
        })?;

        Ok(HostEntry {
            address: address.to_string(),
            hostname: hostname.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_list_address_preferred() {
        let extractor = AddressExtractor::default();
        let host = extractor
            .extract(
                &attrs(&[
                    ("name", "web1"),
                    ("guest_ip_addresses.0", "10.0.0.9"),
                    ("default_ip_address", "10.0.0.5"),
                ]),
                "vsphere_virtual_machine.host.0",
                "web",
            )
            .unwrap();
        assert_eq!(host.address, "10.0.0.9");
        assert_eq!(host.hostname, "web1");
    }

    #[test]
    fn test_empty_list_address_falls_back() {
        let extractor = AddressExtractor::default();
        let host = extractor
            .extract(
                &attrs(&[
                    ("name", "web1"),
                    ("guest_ip_addresses.0", ""),
                    ("default_ip_address", "10.0.0.5"),
                ]),
                "r",
                "web",
            )
            .unwrap();
        assert_eq!(host.address, "10.0.0.5");
    }

    #[test]
    fn test_missing_address() {
        let extractor = AddressExtractor::default();
        let err = extractor
            .extract(&attrs(&[("name", "web1")]), "vm.host.0", "web")
            .unwrap_err();
        assert!(matches!(
            err,
            ConvertError::MissingAddress { ref resource, ref group, .. }
                if resource == "vm.host.0" && group == "web"
        ));
    }

    #[test]
    fn test_missing_name() {
        let extractor = AddressExtractor::default();
        let err = extractor
            .extract(
                &attrs(&[("name", ""), ("default_ip_address", "10.0.0.5")]),
                "vm.host.0",
                "web",
            )
            .unwrap_err();
        assert!(matches!(err, ConvertError::MissingName { .. }));
    }

    #[test]
    fn test_address_checked_before_name() {
        let extractor = AddressExtractor::default();
        let err = extractor.extract(&attrs(&[]), "r", "g").unwrap_err();
        assert!(matches!(err, ConvertError::MissingAddress { .. }));
    }
}
