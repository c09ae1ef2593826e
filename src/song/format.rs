use std::path::Path;

use super::error::WithTrackContext as _;

/// Formats a title from the path of a song.
///
/// This will strip the track numbers that are usually present
/// at the start of ripped files, like `01. ` or `(3) `, and
/// turn underscores into spaces.
pub fn title(path: &Path) -> super::Result<String> {
    let name = path
        .file_stem()
        .and_then(|x| x.to_str())
        .ok_or(super::error::Kind::InvalidName)
        .track(path.display().to_string())?;

    let name = name.replace('_', " ");

    // This is incremented for each digit in front of the song name.
    let mut skip = 0;

    for character in name.as_bytes() {
        if character.is_ascii_digit()
            || *character == b'.'
            || *character == b')'
            || *character == b'('
            || *character == b'-'
            || *character == b' '
        {
            skip += 1;
        } else {
            break;
        }
    }

    // If the entire name of the song is a number, then just return it.
    if skip == name.len() {
        Ok(name.trim().to_owned())
    } else {
        // We've already checked before that the bound is at an ASCII character.
        #[allow(clippy::string_slice)]
        Ok(String::from(name[skip..].trim()))
    }
}
