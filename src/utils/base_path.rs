//! Remote (POSIX) path joining.
//!
//! Remote paths are plain strings: the invoking machine may not share the
//! target's path conventions, so `std::path` is not used for them.

/// Join `path` onto `base`. An absolute `path` replaces the base.
pub fn join_remote_path(base: &str, path: &str) -> String {
    let path = path.trim();

    if path.starts_with('/') || base.is_empty() {
        return path.to_string();
    }

    if path.is_empty() {
        return base.to_string();
    }

    if base.ends_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

/// Final path component, ignoring trailing slashes.
pub fn remote_basename(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_relative_onto_base() {
        assert_eq!(join_remote_path("/srv/lutris", "lutris.net"), "/srv/lutris/lutris.net");
        assert_eq!(
            join_remote_path("/srv/backup/sql/", "dump.tar.gz"),
            "/srv/backup/sql/dump.tar.gz"
        );
    }

    #[test]
    fn absolute_path_replaces_base() {
        assert_eq!(join_remote_path("/srv/lutris", "/etc/supervisor"), "/etc/supervisor");
    }

    #[test]
    fn empty_segments() {
        assert_eq!(join_remote_path("", "config"), "config");
        assert_eq!(join_remote_path("/srv", ""), "/srv");
    }

    #[test]
    fn basename() {
        assert_eq!(remote_basename("/srv/lutris/lutrisweb-celery.conf"), "lutrisweb-celery.conf");
        assert_eq!(remote_basename("/srv/backup/sql/"), "sql");
        assert_eq!(remote_basename("file"), "file");
    }
}
