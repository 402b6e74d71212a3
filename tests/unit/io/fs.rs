use super::*;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "pixbank_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn dir_lookup_is_case_insensitive() {
    let tmp = temp_dir("fs_case");
    std::fs::create_dir_all(&tmp).unwrap();
    std::fs::write(tmp.join("Level1.Map"), [1u8, 2, 3]).unwrap();

    let fs = DirFileSystem::open(&tmp).unwrap();
    assert!(fs.exists("LEVEL1.MAP"));
    assert_eq!(fs.read("level1.map").unwrap(), Some(vec![1, 2, 3]));
    assert_eq!(fs.read("LEVEL2.MAP").unwrap(), None);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn missing_directory_is_an_error() {
    assert!(DirFileSystem::open(temp_dir("fs_missing")).is_err());
}

#[test]
fn detection_follows_marker_priority() {
    let fs = MemoryFileSystem::new().with("level1.lev", vec![0u8]);
    assert_eq!(detect_family(&fs), Some(AssetFamily::Planar));

    let fs = fs.with("LEVEL1.MAP", vec![0u8]);
    assert_eq!(detect_family(&fs), Some(AssetFamily::Nibble));

    assert_eq!(detect_family(&MemoryFileSystem::new()), None);
}
