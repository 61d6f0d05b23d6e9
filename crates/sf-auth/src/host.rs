//! Instance derivation from a hosted page's host name.
//!
//! Hosted pages are served from hosts such as `abc.na1.visual.force.com`,
//! `na1.salesforce.com` or `abc.my.salesforce.com`. The instance the session
//! belongs to is recovered from the labels with a fixed three-way rule, and
//! the rule is kept exactly as deployed pages depend on it.

/// Base domain every derived instance origin lives under.
pub const INSTANCE_BASE_DOMAIN: &str = "salesforce.com";

/// Label marking a custom ("My Domain") host in the four-label shape.
const MY_DOMAIN_MARKER: &str = "my";

/// Instance identifier for a page host name.
///
/// - four labels with `my` second: the first two labels (`abc.my`)
/// - three labels: the first label (`na1`)
/// - anything else: the second label (`abc.na1.visual.force.com` -> `na1`)
///
/// Returns `None` only when the host has no label at the chosen position.
pub fn instance_from_host(host: &str) -> Option<String> {
    let labels: Vec<&str> = host.split('.').collect();

    let instance = if labels.len() == 4 && labels[1] == MY_DOMAIN_MARKER {
        format!("{}.{}", labels[0], labels[1])
    } else if labels.len() == 3 {
        labels[0].to_string()
    } else {
        labels.get(1)?.to_string()
    };

    (!instance.is_empty()).then_some(instance)
}

/// Instance origin (`https://<instance>.salesforce.com`) for a page host name.
pub fn instance_origin_from_host(host: &str) -> Option<String> {
    instance_from_host(host).map(|instance| format!("https://{}.{}", instance, INSTANCE_BASE_DOMAIN))
}
