//! CLI command: decode a package and render its report.

use std::io::Write;
use std::path::Path;

use upkforge::formats::upk::UpkPackage;
use upkforge::report::PackageReport;

pub fn run(package_path: &Path, json: bool) -> anyhow::Result<()> {
    let package = UpkPackage::read_path(package_path)?;
    let report = PackageReport::new(&package);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &report.json())?;
        writeln!(out)?;
    } else {
        report.write_text(&mut out)?;
    }

    if package.header.is_compressed() {
        writeln!(
            out,
            "The package is compressed; only the header was decoded. \
Decompress it with an external tool to inspect the tables or repackage it."
        )?;
    }

    Ok(())
}
