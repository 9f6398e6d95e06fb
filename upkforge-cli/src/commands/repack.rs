//! CLI command: repackage with replacement payloads.

use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use upkforge::repack::Repackager;

pub fn run(source: &Path, extracted: &Path, output: &Path, quiet: bool) -> anyhow::Result<()> {
    let repackager = Repackager::new(source, extracted);

    let summary = if quiet {
        repackager.write(output)?
    } else {
        let bar = ProgressBar::no_length().with_style(
            ProgressStyle::default_bar()
                .template("{msg} [{bar:40.cyan/blue}] {pos}/{len}")
                .expect("valid template"),
        );
        let summary = repackager.write_with_progress(output, &|current, total, name| {
            bar.set_length(total as u64);
            bar.set_position(current as u64);
            bar.set_message(format!("Patching {name}"));
        })?;
        bar.finish_with_message("Done");
        summary
    };

    println!(
        "Patched {} exports ({} payload bytes) into {}",
        summary.exports_patched,
        summary.payload_bytes,
        summary.output.display()
    );
    Ok(())
}
