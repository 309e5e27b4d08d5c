//! Release packaging: archives and checksum file.
//!
//! Takes the static binary already copied into the releases directory and
//! produces the `.tar.gz` and `.zip` archives plus a `sha256sum`-format
//! checksum file covering the binary and both archives.

use super::checksums::{ChecksumEntry, ChecksumFile};
use super::naming::ArtefactName;
use super::packaging_error::PackagingError;
use super::sha256_digest::Sha256Digest;
use flate2::Compression;
use flate2::write::GzEncoder;
use log::{debug, info};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

/// Permission bits recorded for the binary inside both archives.
const EXECUTABLE_MODE: u32 = 0o755;

/// Input parameters for [`package_release`].
#[derive(Debug)]
pub struct PackageParams {
    /// Naming for every produced asset.
    pub name: ArtefactName,
    /// Directory holding the copied binary; archives are written alongside.
    pub releases_dir: PathBuf,
}

/// The full set of release assets on disk.
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseArtefacts {
    /// The standalone static binary.
    pub binary: PathBuf,
    /// The gzip-compressed tarball.
    pub tar_gz: PathBuf,
    /// The zip archive.
    pub zip: PathBuf,
    /// The `sha256sum`-format checksum file.
    pub checksums: PathBuf,
}

impl ReleaseArtefacts {
    /// Derive the expected asset paths without touching the filesystem.
    #[must_use]
    pub fn expected(name: &ArtefactName, releases_dir: &Path) -> Self {
        Self {
            binary: releases_dir.join(name.binary_file()),
            tar_gz: releases_dir.join(name.tar_gz_file()),
            zip: releases_dir.join(name.zip_file()),
            checksums: releases_dir.join(name.checksum_file()),
        }
    }

    /// All four assets in upload order: binary, tarball, zip, checksums.
    #[must_use]
    pub fn upload_order(&self) -> [&Path; 4] {
        [&self.binary, &self.tar_gz, &self.zip, &self.checksums]
    }

    /// The assets covered by the checksum file, in the order they are listed.
    #[must_use]
    pub fn checksummed(&self) -> [&Path; 3] {
        [&self.binary, &self.tar_gz, &self.zip]
    }
}

/// Compute the SHA-256 digest of a file.
///
/// # Errors
///
/// Returns [`PackagingError::Io`] if the file cannot be read.
pub fn compute_sha256(path: &Path) -> Result<Sha256Digest, PackagingError> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(buffer.get(..bytes_read).unwrap_or_default());
    }
    Ok(Sha256Digest::from_bytes(&hasher.finalize())?)
}

/// Write a gzip-compressed tarball containing `source` as `entry_name`.
///
/// The header is built by hand with a zero mtime and owner and mode `0o755`,
/// so rebuilding the same binary yields an identical archive and the entry
/// is executable whatever the source file's permissions.
///
/// # Errors
///
/// Returns [`PackagingError::Io`] if the source cannot be read or the output
/// cannot be written.
pub fn create_tar_gz(source: &Path, entry_name: &str, output: &Path) -> Result<(), PackagingError> {
    let output_file = fs::File::create(output)?;
    let encoder = GzEncoder::new(output_file, Compression::default());
    let mut archive = tar::Builder::new(encoder);
    let mut input = fs::File::open(source)?;
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::Regular);
    header.set_size(input.metadata()?.len());
    header.set_mode(EXECUTABLE_MODE);
    header.set_mtime(0);
    header.set_cksum();
    archive.append_data(&mut header, entry_name, &mut input)?;
    archive.into_inner()?.finish()?;
    Ok(())
}

/// Write a deflate zip archive containing `source` as `entry_name`.
///
/// The entry is marked executable so unzipping on Unix yields a runnable
/// binary.
///
/// # Errors
///
/// Returns [`PackagingError::Io`] or [`PackagingError::Zip`] on failure.
pub fn create_zip(source: &Path, entry_name: &str, output: &Path) -> Result<(), PackagingError> {
    let output_file = fs::File::create(output)?;
    let mut archive = zip::ZipWriter::new(output_file);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(EXECUTABLE_MODE);

    archive.start_file(entry_name, options)?;
    let mut input = fs::File::open(source)?;
    io::copy(&mut input, &mut archive)?;
    archive.finish()?;
    Ok(())
}

/// Build the checksum file contents for a set of assets.
///
/// Each entry records the asset's basename, matching what `sha256sum` prints
/// when run from inside the releases directory.
///
/// # Errors
///
/// Returns [`PackagingError::Io`] if an asset cannot be read.
pub fn checksum_assets(paths: &[&Path]) -> Result<ChecksumFile, PackagingError> {
    let mut file = ChecksumFile::default();
    for path in paths {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| PackagingError::MissingBinary(path.to_path_buf()))?;
        let digest = compute_sha256(path)?;
        debug!("sha256 {digest}  {filename}");
        file.push(ChecksumEntry { digest, filename });
    }
    Ok(file)
}

/// Package the copied binary into archives and write the checksum file.
///
/// # Errors
///
/// Returns [`PackagingError::MissingBinary`] if the binary has not been
/// copied into the releases directory, or an I/O / zip error if writing any
/// asset fails.
pub fn package_release(params: &PackageParams) -> Result<ReleaseArtefacts, PackagingError> {
    let artefacts = ReleaseArtefacts::expected(&params.name, &params.releases_dir);

    if !artefacts.binary.is_file() {
        return Err(PackagingError::MissingBinary(artefacts.binary));
    }

    let entry_name = params.name.binary().as_str();

    info!("writing {}", artefacts.tar_gz.display());
    create_tar_gz(&artefacts.binary, entry_name, &artefacts.tar_gz)?;

    info!("writing {}", artefacts.zip.display());
    create_zip(&artefacts.binary, entry_name, &artefacts.zip)?;

    let checksums = checksum_assets(&artefacts.checksummed())?;
    info!("writing {}", artefacts.checksums.display());
    fs::write(&artefacts.checksums, checksums.render())?;

    Ok(artefacts)
}

#[cfg(test)]
#[path = "packaging_tests.rs"]
mod tests;
