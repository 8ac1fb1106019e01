use std::io;
use std::path::{Path, PathBuf};

/// Every saved asset gets this extension regardless of its content type
pub const ASSET_EXTENSION: &str = "jpg";

/// File name for the image at `ordinal_index` of an item
///
/// The name is `<item_id>_<item_name>_<ordinal_index + 1>.jpg`. It depends
/// only on its inputs, so re-running a harvest overwrites earlier files
/// instead of creating duplicates.
///
/// # Examples
///
/// ```
/// use gallery_harvest::output::asset_file_name;
///
/// assert_eq!(asset_file_name("dkp-42", "desk-lamp", 0), "dkp-42_desk-lamp_1.jpg");
/// ```
pub fn asset_file_name(item_id: &str, item_name: &str, ordinal_index: usize) -> String {
    format!(
        "{}_{}_{}.{}",
        item_id,
        item_name,
        ordinal_index + 1,
        ASSET_EXTENSION
    )
}

/// Full destination path of an asset inside `output_dir`
pub fn asset_path(
    output_dir: &Path,
    item_id: &str,
    item_name: &str,
    ordinal_index: usize,
) -> PathBuf {
    output_dir.join(asset_file_name(item_id, item_name, ordinal_index))
}

/// Creates the output directory if it does not exist yet
///
/// Fails if the path exists but is not a directory.
pub fn prepare_output_dir(output_dir: &Path) -> io::Result<()> {
    if output_dir.exists() && !output_dir.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} exists and is not a directory", output_dir.display()),
        ));
    }

    std::fs::create_dir_all(output_dir)?;
    tracing::debug!("Output directory ready: {}", output_dir.display());
    Ok(())
}
