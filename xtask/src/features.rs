use anyhow::{Context, Result};

/// `listify-common` tiers that downstream crates enable on their own.
const TIERS: &[&[&str]] =
    &[&[], &["foundation"], &["observability"], &["runtime"], &["platform"], &["test-utils"]];

/// `cargo check` listify-common once per tier, with default features only
/// for the empty tier.
pub fn check_tiers() -> Result<()> {
    for (index, tier) in TIERS.iter().enumerate() {
        let label = if tier.is_empty() { "default".to_string() } else { tier.join(",") };
        println!("--> [{}/{}] listify-common: {label}", index + 1, TIERS.len());

        let mut args = vec!["check", "-p", "listify-common"];
        let joined = tier.join(",");
        if !tier.is_empty() {
            args.extend(["--features", joined.as_str()]);
        }
        crate::cargo(&args).with_context(|| format!("feature tier `{label}` does not compile"))?;
    }
    println!("all {} tiers compile", TIERS.len());
    Ok(())
}
