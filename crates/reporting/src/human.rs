use staticlink_core::{Dependency, VerificationResult};

const RULE_WIDTH: usize = 80;

pub fn render_human(result: &VerificationResult, verbose: bool) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    out.push_str(&format!("\n{rule}\n"));
    out.push_str(&format!("Static Linking Verification - {}\n", result.platform()));
    out.push_str(&format!("{rule}\n\n"));

    out.push_str(&format!("Binary: {}\n", result.binary().display()));
    out.push_str(&format!(
        "Status: {} {}\n\n",
        result.status().symbol(),
        result.message()
    ));

    if !result.details().is_empty() {
        out.push_str("Details:\n");
        for detail in result.details() {
            out.push_str(&format!("  • {detail}\n"));
        }
        out.push('\n');
    }

    if !result.dependencies().is_empty() {
        out.push_str(&format!("Dependencies ({}):\n", result.dependencies().len()));
        let system: Vec<_> = result.system_dependencies().collect();
        let third_party: Vec<_> = result.third_party_dependencies().collect();
        push_group(&mut out, "System libraries", &system, verbose);
        push_group(&mut out, "Third-party libraries", &third_party, verbose);
    }

    out.push_str(&format!("\n{rule}\n"));
    out
}

fn push_group(out: &mut String, title: &str, deps: &[&Dependency], verbose: bool) {
    if deps.is_empty() {
        return;
    }
    out.push_str(&format!("\n  {title} ({}):\n", deps.len()));
    for dep in deps {
        match (&dep.path, verbose) {
            (Some(path), true) => out.push_str(&format!("    • {} ({path})\n", dep.name)),
            _ => out.push_str(&format!("    • {}\n", dep.name)),
        }
    }
}
