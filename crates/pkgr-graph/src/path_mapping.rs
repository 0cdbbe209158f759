//! `compilerOptions.paths` overlay for cross entry point imports.

use pkgr_config::TsConfig;

use crate::node::EntryPoint;

/// Return a copy of `ts_config` whose `paths` map every entry point's module
/// id to a file of that entry point.
///
/// With `resolve_to_source` the target is the entry point's source entry file,
/// so importing a sibling entry point does not require it to be built first.
/// Otherwise the target is its declarations file. Mappings already present
/// for a module id stay in front of the generated one. Entry points without
/// the relevant file are left out.
pub fn set_dependencies_ts_config_paths<'a>(
    ts_config: &TsConfig,
    entry_points: impl IntoIterator<Item = &'a EntryPoint>,
    resolve_to_source: bool,
) -> TsConfig {
    let mut overlay = ts_config.clone();

    for entry_point in entry_points {
        let target = if resolve_to_source {
            entry_point.entry_file.as_deref()
        } else {
            entry_point.declarations_file.as_deref()
        };
        let Some(target) = target else {
            continue;
        };

        overlay
            .options
            .add_path_mapping(entry_point.module_id.as_str(), target.to_string_lossy());
    }

    overlay
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgr_config::CompilerOptions;
    use std::path::PathBuf;

    fn entry_points() -> Vec<EntryPoint> {
        vec![
            EntryPoint::new("@lib/core")
                .with_entry_file("/repo/core/src/public-api.ts")
                .with_declarations_file("/repo/dist/core/index.d.ts"),
            EntryPoint::new("@lib/core/testing")
                .with_entry_file("/repo/core/testing/src/public-api.ts"),
        ]
    }

    #[test]
    fn maps_module_ids_to_source_entry_files() {
        let mut options = CompilerOptions::default();
        options.add_path_mapping("@lib/core", "/custom/core.ts");
        options.add_path_mapping("rxjs", "/vendor/rxjs");
        let original = TsConfig::new(vec![PathBuf::from("/repo/app/main.ts")], options);

        let overlay = set_dependencies_ts_config_paths(&original, &entry_points(), true);

        assert_eq!(
            overlay.options.path_targets("@lib/core").unwrap(),
            ["/custom/core.ts", "/repo/core/src/public-api.ts"]
        );
        assert_eq!(
            overlay.options.path_targets("@lib/core/testing").unwrap(),
            ["/repo/core/testing/src/public-api.ts"]
        );
        assert_eq!(overlay.options.path_targets("rxjs").unwrap(), ["/vendor/rxjs"]);
        assert_eq!(overlay.root_names, original.root_names);

        // input untouched
        assert_eq!(original.options.path_targets("@lib/core").unwrap(), ["/custom/core.ts"]);
        assert!(original.options.path_targets("@lib/core/testing").is_none());
    }

    #[test]
    fn maps_to_declarations_when_not_resolving_to_source() {
        let original = TsConfig::new(Vec::new(), CompilerOptions::default());
        let overlay = set_dependencies_ts_config_paths(&original, &entry_points(), false);

        assert_eq!(
            overlay.options.path_targets("@lib/core").unwrap(),
            ["/repo/dist/core/index.d.ts"]
        );
        assert!(overlay.options.path_targets("@lib/core/testing").is_none());
    }

    #[test]
    fn repeated_overlays_do_not_duplicate_targets() {
        let original = TsConfig::new(Vec::new(), CompilerOptions::default());
        let once = set_dependencies_ts_config_paths(&original, &entry_points(), true);
        let twice = set_dependencies_ts_config_paths(&once, &entry_points(), true);
        assert_eq!(once, twice);
    }
}
