//! File emission
//!
//! Serializes the final registry to the destination tree: the output root
//! and one folder per configured chapter are created up front, then each
//! record's body is written one line per line to its folder/file. The
//! manifest utility is independent of the pipeline: it walks whatever the
//! output root contains and lists every file with an inclusion directive.

use addex_config::ChapterMapping;
use addex_extract::extract::Definition;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Name of the manifest file written into the output root.
const MANIFEST_FILE: &str = "IncFileList.txt";

/// Write every definition under the output root. Returns the written paths.
pub fn emit_files(
    out_root: &Path,
    chapters: &[ChapterMapping],
    definitions: &BTreeMap<String, Definition>,
) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(out_root)?;
    for chapter in chapters {
        fs::create_dir_all(out_root.join(&chapter.folder))?;
    }

    let mut written = Vec::new();
    for definition in definitions.values() {
        // Records closed before any chapter header carry no folder and land
        // in the root itself.
        let dir = out_root.join(&definition.folder);
        fs::create_dir_all(&dir)?;
        let path = dir.join(&definition.file_name);
        let mut file = fs::File::create(&path)?;
        for line in &definition.body {
            writeln!(file, "{}", line)?;
        }
        tracing::debug!(path = %path.display(), "definition written");
        written.push(path);
    }
    Ok(written)
}

/// Walk the output root and write `include("<folder>/<file>")` directives,
/// sorted, one per file, into the manifest. Returns the manifest path.
pub fn write_manifest(out_root: &Path) -> io::Result<PathBuf> {
    let mut directives = Vec::new();
    collect_directives(out_root, Path::new(""), &mut directives)?;
    directives.sort();

    let path = out_root.join(MANIFEST_FILE);
    let mut file = fs::File::create(&path)?;
    for directive in &directives {
        writeln!(file, "{}", directive)?;
    }
    Ok(path)
}

fn collect_directives(
    dir: &Path,
    relative: &Path,
    directives: &mut Vec<String>,
) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name == MANIFEST_FILE {
            continue;
        }
        let rel = relative.join(name.as_ref());
        if entry.file_type()?.is_dir() {
            collect_directives(&entry.path(), &rel, directives)?;
        } else {
            // Manifest entries always use forward slashes, whatever the host.
            let rel = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            directives.push(format!("include(\"{}\")", rel));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use addex_extract::extract::Definition;
    use std::collections::BTreeSet;

    fn definition(name: &str, folder: &str, body: &[&str]) -> Definition {
        Definition::new(
            name.to_string(),
            format!("{}.jl", name),
            folder.to_string(),
            body.iter().map(|l| l.to_string()).collect(),
            BTreeSet::new(),
        )
    }

    fn chapters() -> Vec<ChapterMapping> {
        vec![ChapterMapping {
            header: "2 Surveillance and Tracking Module Description".to_string(),
            folder: "STM".to_string(),
        }]
    }

    #[test]
    fn test_emit_writes_bodies_line_per_line() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("out");
        let mut defs = BTreeMap::new();
        defs.insert(
            "Foo".to_string(),
            definition("Foo", "STM", &["function Foo()", "    x = 1", "end"]),
        );

        let written = emit_files(&root, &chapters(), &defs).unwrap();
        assert_eq!(written, vec![root.join("STM").join("Foo.jl")]);
        let contents = fs::read_to_string(&written[0]).unwrap();
        assert_eq!(contents, "function Foo()\n    x = 1\nend\n");
    }

    #[test]
    fn test_chapter_folders_created_up_front() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("out");
        emit_files(&root, &chapters(), &BTreeMap::new()).unwrap();
        assert!(root.join("STM").is_dir());
    }

    #[test]
    fn test_manifest_lists_files_with_include_directives() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("out");
        let mut defs = BTreeMap::new();
        defs.insert(
            "Foo".to_string(),
            definition("Foo", "STM", &["function Foo()", "end"]),
        );
        defs.insert("Bare".to_string(), definition("Bare", "", &["type Bare", "end"]));
        emit_files(&root, &chapters(), &defs).unwrap();

        let manifest = write_manifest(&root).unwrap();
        let contents = fs::read_to_string(manifest).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines, vec!["include(\"Bare.jl\")", "include(\"STM/Foo.jl\")"]);
    }
}
