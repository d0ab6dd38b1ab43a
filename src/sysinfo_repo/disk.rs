// Mount point selection for disk usage.

use std::path::Path;

/// Index of the mount that is the longest component-wise prefix of `path`.
pub fn covering_mount(path: &Path, mounts: &[&Path]) -> Option<usize> {
    mounts
        .iter()
        .enumerate()
        .filter(|(_, m)| path.starts_with(m))
        .max_by_key(|(_, m)| m.components().count())
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_deepest_mount() {
        let mounts = [Path::new("/"), Path::new("/home"), Path::new("/boot")];
        assert_eq!(covering_mount(Path::new("/home/user/data"), &mounts), Some(1));
        assert_eq!(covering_mount(Path::new("/var/log"), &mounts), Some(0));
        assert_eq!(covering_mount(Path::new("/"), &mounts), Some(0));
    }

    #[test]
    fn prefix_is_per_component() {
        let mounts = [Path::new("/"), Path::new("/data")];
        assert_eq!(covering_mount(Path::new("/database"), &mounts), Some(0));
    }

    #[test]
    fn relative_path_has_no_mount() {
        let mounts = [Path::new("/")];
        assert_eq!(covering_mount(Path::new("data"), &mounts), None);
    }
}
