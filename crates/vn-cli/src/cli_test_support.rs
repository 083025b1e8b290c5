use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub(crate) const DEMO_TABLE: &str = "id,text,image,audio,sfx,sfx_vol,option1,target1,option2,target2\n\
intro,\"Wake up, traveler.\",hall.png,theme.ogg,door.wav,80,Go left,left,Go right,right\n\
left,The left path is quiet.,,theme.ogg,,,Back,intro,,\n\
right,A storm rolls in.,storm.png,,thunder.wav,250,,,Onward,nowhere\n";

pub(crate) fn temp_path(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time should be monotonic")
        .as_nanos();
    std::env::temp_dir().join(format!("tablenovel-cli-{}-{}", nanos, name))
}

pub(crate) fn temp_dir(name: &str) -> PathBuf {
    let path = temp_path(name);
    fs::create_dir_all(&path).expect("temp dir should be created");
    path
}

pub(crate) fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("parent dir should be created");
    }
    fs::write(path, contents).expect("file should be written");
}

/// Writes the demo table plus every asset it names except `storm.png`.
pub(crate) fn demo_story_dir() -> PathBuf {
    let base = temp_dir("story");
    write_file(&base.join("story.csv"), DEMO_TABLE);
    write_file(&base.join("images").join("hall.png"), "png");
    write_file(&base.join("audio").join("theme.ogg"), "ogg");
    write_file(&base.join("audio").join("door.wav"), "wav");
    write_file(&base.join("audio").join("thunder.wav"), "wav");
    base
}
