//! Blueprint request template customization.
//!
//! The automation platform hands out a request template per catalog item.
//! [`customize_request`] fills a validated [`GuestConfig`] into a copy of that
//! template: sizing, hostname and network go into the machine component, and
//! each extra disk is appended as a clone of the base disk.
//!
//! Template layout (only the parts touched here):
//!
//! ```text
//! data.<blueprint_instance_id>.data.cpu
//! data.<blueprint_instance_id>.data.memory
//! data.<blueprint_instance_id>.data.Hostname
//! data.<blueprint_instance_id>.data."VirtualMachine.Network0.Name"
//! data.<blueprint_instance_id>.data.disks[0].data.id
//! ```

use serde_json::{Map, Value, json};
use tracing::debug;

use crate::guest::GuestConfig;

/// Key of the guest hostname custom property on the machine component.
pub const HOSTNAME_PROPERTY: &str = "Hostname";

/// Key selecting the network for the first adapter.
pub const NETWORK_PROPERTY: &str = "VirtualMachine.Network0.Name";

/// Errors that can occur while customizing a request template.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// The template has no machine component with the configured ID.
    #[error("template has no component data for blueprint instance '{0}'")]
    MissingComponent(String),

    /// Extra disks were requested but the template has no base disk to copy.
    #[error("template component has no base disk to copy extra disks from")]
    MissingDisks,

    /// The base disk is not shaped as expected.
    #[error("template base disk is invalid: {0}")]
    InvalidBaseDisk(&'static str),
}

/// A specialized `Result` type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Returns a copy of `template` customized for `config`.
///
/// The input template is left untouched. Disk entries added for extra disks
/// get labels starting at `Hard disk 2`, volume IDs starting at 1 and IDs
/// that continue from the base disk's ID.
///
/// # Errors
///
/// Returns [`TemplateError::MissingComponent`] if the machine component is
/// absent, and [`TemplateError::MissingDisks`] or
/// [`TemplateError::InvalidBaseDisk`] if extra disks are requested but the
/// base disk cannot be cloned.
pub fn customize_request(template: &Value, config: &GuestConfig) -> Result<Value> {
    let mut request = template.clone();
    let instance_id = config.blueprint_instance_id();

    let component = request
        .get_mut("data")
        .and_then(|data| data.get_mut(instance_id))
        .and_then(|component| component.get_mut("data"))
        .and_then(Value::as_object_mut)
        .ok_or_else(|| TemplateError::MissingComponent(instance_id.to_string()))?;

    component.insert("cpu".into(), json!(config.cpu()));
    component.insert("memory".into(), json!(config.memory()));
    component.insert(HOSTNAME_PROPERTY.into(), json!(config.hostname()));
    component.insert(NETWORK_PROPERTY.into(), json!(config.network_adapter()));

    if !config.extra_disks().is_empty() {
        append_extra_disks(component, config)?;
    }

    debug!(
        instance_id,
        extra_disks = config.extra_disks().len(),
        "customized request template"
    );
    Ok(request)
}

fn append_extra_disks(component: &mut Map<String, Value>, config: &GuestConfig) -> Result<()> {
    let disks = component
        .get_mut("disks")
        .and_then(Value::as_array_mut)
        .ok_or(TemplateError::MissingDisks)?;
    let base = disks.first().cloned().ok_or(TemplateError::MissingDisks)?;

    let base_id = base
        .get("data")
        .and_then(|data| data.get("id"))
        .and_then(Value::as_i64)
        .ok_or(TemplateError::InvalidBaseDisk("data.id is not an integer"))?;

    for (offset, disk) in (1i64..).zip(config.extra_disks()) {
        let mut entry = base.clone();
        let data = entry
            .get_mut("data")
            .and_then(Value::as_object_mut)
            .ok_or(TemplateError::InvalidBaseDisk("data is not an object"))?;

        data.insert("capacity".into(), json!(disk.size_gb));
        data.insert("label".into(), json!(format!("Hard disk {}", offset + 1)));
        data.insert("volumeId".into(), json!(offset));
        let id = base_id
            .checked_add(offset)
            .ok_or(TemplateError::InvalidBaseDisk("data.id overflows"))?;
        data.insert("id".into(), json!(id));
        data.insert("userCreated".into(), json!("true"));
        data.insert("is_clone".into(), json!("false"));
        data.insert("initial_location".into(), json!(disk.mount_point));

        disks.push(entry);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_params;
    use pretty_assertions::assert_eq;

    fn config(extra_disks: Value) -> GuestConfig {
        let params = json!({
            "blueprint_instance_id": "vSphere__vCenter__Machine_1",
            "blueprint_name": "Linux",
            "cpu": 4,
            "extra_disks": extra_disks,
            "hostname": "test-linux-vm-1",
            "memory": 8192,
            "network_adapter": "dvs-prod",
            "vra_hostname": "vra.example.test",
            "vra_password": "pw-never-rendered",
            "vra_tenant": "vsphere.local",
            "vra_username": "automation-user"
        });
        validate_params(params.as_object().unwrap()).unwrap()
    }

    fn template() -> Value {
        json!({
            "type": "com.vmware.vcac.catalog.domain.request.CatalogItemProvisioningRequest",
            "data": {
                "vSphere__vCenter__Machine_1": {
                    "componentTypeId": "com.vmware.csp.iaas.blueprint.service",
                    "data": {
                        "cpu": 1,
                        "memory": 1024,
                        "disks": [{
                            "componentTypeId": "com.vmware.csp.iaas.blueprint.service",
                            "data": {
                                "capacity": 40,
                                "id": 1516123456789i64,
                                "label": "Hard disk 1",
                                "volumeId": 0,
                                "userCreated": "false",
                                "is_clone": "true",
                                "initial_location": ""
                            }
                        }]
                    }
                }
            }
        })
    }

    fn component(request: &Value) -> &Value {
        &request["data"]["vSphere__vCenter__Machine_1"]["data"]
    }

    #[test]
    fn sets_machine_properties() {
        let request = customize_request(&template(), &config(json!([]))).unwrap();
        let data = component(&request);
        assert_eq!(data["cpu"], json!(4));
        assert_eq!(data["memory"], json!(8192));
        assert_eq!(data["Hostname"], json!("test-linux-vm-1"));
        assert_eq!(data["VirtualMachine.Network0.Name"], json!("dvs-prod"));
        assert_eq!(data["disks"].as_array().unwrap().len(), 1);
        // Untouched siblings survive.
        assert_eq!(
            request["type"],
            json!("com.vmware.vcac.catalog.domain.request.CatalogItemProvisioningRequest")
        );
    }

    #[test]
    fn appends_extra_disks_in_order() {
        let cfg = config(json!([
            {"size_gb": 60, "mount_point": "/mnt1"},
            {"size_gb": 80, "mount_point": "/mnt2"}
        ]));
        let request = customize_request(&template(), &cfg).unwrap();
        let disks = component(&request)["disks"].as_array().unwrap();
        assert_eq!(disks.len(), 3);

        assert_eq!(
            disks[1]["data"],
            json!({
                "capacity": 60,
                "id": 1516123456790i64,
                "label": "Hard disk 2",
                "volumeId": 1,
                "userCreated": "true",
                "is_clone": "false",
                "initial_location": "/mnt1"
            })
        );
        assert_eq!(disks[2]["data"]["label"], json!("Hard disk 3"));
        assert_eq!(disks[2]["data"]["volumeId"], json!(2));
        assert_eq!(disks[2]["data"]["id"], json!(1516123456791i64));
        assert_eq!(disks[2]["data"]["initial_location"], json!("/mnt2"));
        assert_eq!(
            disks[2]["componentTypeId"],
            json!("com.vmware.csp.iaas.blueprint.service")
        );
    }

    #[test]
    fn input_template_is_not_mutated() {
        let original = template();
        let cfg = config(json!([{"size_gb": 10, "mount_point": "/data"}]));
        let _ = customize_request(&original, &cfg).unwrap();
        assert_eq!(original, template());
    }

    #[test]
    fn password_is_never_rendered() {
        let cfg = config(json!([{"size_gb": 10, "mount_point": "/data"}]));
        let request = customize_request(&template(), &cfg).unwrap();
        assert!(!request.to_string().contains("pw-never-rendered"));
    }

    #[test]
    fn missing_component_fails() {
        let err = customize_request(&json!({"data": {}}), &config(json!([]))).unwrap_err();
        assert!(matches!(err, TemplateError::MissingComponent(ref id) if id == "vSphere__vCenter__Machine_1"));
    }

    #[test]
    fn extra_disks_need_a_base_disk() {
        let mut tpl = template();
        tpl["data"]["vSphere__vCenter__Machine_1"]["data"]["disks"] = json!([]);
        let cfg = config(json!([{"size_gb": 10, "mount_point": "/data"}]));
        assert!(matches!(
            customize_request(&tpl, &cfg),
            Err(TemplateError::MissingDisks)
        ));

        // Without extra disks an empty disk list is fine.
        assert!(customize_request(&tpl, &config(json!([]))).is_ok());
    }

    #[test]
    fn base_disk_id_must_be_integer() {
        let mut tpl = template();
        tpl["data"]["vSphere__vCenter__Machine_1"]["data"]["disks"][0]["data"]["id"] =
            json!("abc");
        let cfg = config(json!([{"size_gb": 10, "mount_point": "/data"}]));
        assert!(matches!(
            customize_request(&tpl, &cfg),
            Err(TemplateError::InvalidBaseDisk(_))
        ));
    }

    #[test]
    fn base_disk_id_near_max_is_rejected() {
        let mut tpl = template();
        tpl["data"]["vSphere__vCenter__Machine_1"]["data"]["disks"][0]["data"]["id"] =
            json!(i64::MAX);
        let cfg = config(json!([{"size_gb": 10, "mount_point": "/data"}]));
        let err = customize_request(&tpl, &cfg).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidBaseDisk("data.id overflows")));
    }

    #[test]
    fn base_disk_id_at_max_without_extra_disks_is_fine() {
        let mut tpl = template();
        tpl["data"]["vSphere__vCenter__Machine_1"]["data"]["disks"][0]["data"]["id"] =
            json!(i64::MAX);
        let request = customize_request(&tpl, &config(json!([]))).unwrap();
        let disks = &request["data"]["vSphere__vCenter__Machine_1"]["data"]["disks"];
        assert_eq!(disks.as_array().unwrap().len(), 1);
    }
}
