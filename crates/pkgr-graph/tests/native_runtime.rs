//! Analysis of a package laid out on disk.

use std::fs;
use std::path::Path;

use pkgr_config::{AnalysisSettings, TsConfig};
use pkgr_graph::{BuildGraph, EntryPoint, Node, NodeId, OxcCompilerService, SourceAnalyzer};
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn add_entry_point(graph: &mut BuildGraph, root: &Path, module_id: &str, dir: &str) -> NodeId {
    let ts_config = TsConfig::from_file(root.join(dir).join("tsconfig.lib.json")).unwrap();
    graph.put(Node::entry_point(
        EntryPoint::new(module_id).with_entry_file(root.join(dir).join("src/public-api.ts")),
        ts_config,
    ))
}

fn package() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let tsconfig = r#"{ "compilerOptions": { "strict": true }, "files": ["src/public-api.ts"] }"#;

    write(root, "core/tsconfig.lib.json", tsconfig);
    write(root, "core/src/public-api.ts", "export * from './lib/tokens';");
    write(root, "core/src/lib/tokens.ts", "export const TOKEN = 'core';");

    write(root, "core/testing/tsconfig.lib.json", tsconfig);
    write(
        root,
        "core/testing/src/public-api.ts",
        "import { TOKEN } from '@lib/core';\nexport const TEST_TOKEN = TOKEN;",
    );

    write(root, "forms/tsconfig.lib.json", tsconfig);
    write(
        root,
        "forms/src/public-api.ts",
        "export * from './lib/form.component';",
    );
    write(
        root,
        "forms/src/lib/form.component.ts",
        "import { TOKEN } from '@lib/core';\nimport { of } from 'rxjs';\n\
         export const meta = { templateUrl: './form.component.html' };\n\
         export const value = of(TOKEN);",
    );
    temp
}

#[test]
fn test_analyses_a_package_on_disk() {
    let temp = package();
    let root = temp.path();
    let mut graph = BuildGraph::new();
    let testing = add_entry_point(&mut graph, root, "@lib/core/testing", "core/testing");
    let core = add_entry_point(&mut graph, root, "@lib/core", "core");
    let forms = add_entry_point(&mut graph, root, "@lib/forms", "forms");

    let settings = AnalysisSettings::load(root).unwrap();
    let stats = SourceAnalyzer::new(OxcCompilerService::new())
        .settings(settings)
        .analyse(&mut graph)
        .unwrap();

    assert_eq!(stats.entry_points_analysed, 3);
    assert_eq!(stats.edges_added, 2);
    assert!(graph.get(testing).unwrap().has_dependency(core));
    assert!(graph.get(forms).unwrap().has_dependency(core));
    assert_eq!(graph.dependents(core), vec![testing, forms]);
    assert_eq!(graph.build_order().unwrap(), vec![core, testing, forms]);
}

#[test]
fn test_settings_file_is_honoured() {
    let temp = package();
    let root = temp.path();
    write(root, "pkgr.toml", "generated_markers = [\".component\"]\n");
    let mut graph = BuildGraph::new();
    let core = add_entry_point(&mut graph, root, "@lib/core", "core");
    let forms = add_entry_point(&mut graph, root, "@lib/forms", "forms");

    let settings = AnalysisSettings::load(root).unwrap();
    SourceAnalyzer::new(OxcCompilerService::new())
        .settings(settings)
        .analyse(&mut graph)
        .unwrap();

    // The only import of @lib/core lives in a file now treated as generated
    assert!(!graph.get(forms).unwrap().has_dependency(core));
}
