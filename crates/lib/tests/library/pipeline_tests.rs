//! End-to-end tests of the compile, link, archive, export and clean stages.

use cbuild_lib::consts::COMPILE_COMMANDS_FILE;
use cbuild_lib::target::object_path;
use cbuild_lib::{BuildError, CompileCommand};

use crate::common::TestEnv;

// =============================================================================
// Compilation
// =============================================================================

#[test]
fn objects_and_records_follow_sources() {
  let env = TestEnv::new();
  let sources = ["lib/a.cpp", "lib/b.c", "main.cpp"];
  for src in sources {
    env.write_source(src);
  }

  let target = env.target().out("bin", "prog").unwrap().src(sources).build().unwrap();

  assert_eq!(target.objects(), ["lib/a.o", "lib/b.o", "main.o"]);
  assert_eq!(target.objects().len(), target.sources().len());
  assert_eq!(target.compile_commands().len(), target.objects().len());

  let work = env.work();
  for (i, src) in sources.iter().enumerate() {
    assert_eq!(target.objects()[i], object_path(src));
    let record = &target.compile_commands()[i];
    assert_eq!(record.file, work.join(src).to_string_lossy());
    assert_eq!(record.directory, work.to_string_lossy());
    assert!(record.command.ends_with(&format!("-o {} -c {}", object_path(src), src)));
    assert!(env.exists(&object_path(src)));
  }
}

#[test]
fn include_paths_reach_compiler_and_library_lists_reach_linker() {
  let env = TestEnv::new();
  env.write_source("src/main.cpp");

  env
    .target()
    .out("bin", "test")
    .unwrap()
    .flags(["-Wall"])
    .inc_paths(["lib"])
    .lib_paths(["bin"])
    .libs(["sum"])
    .src(["src/main.cpp"])
    .build()
    .unwrap();

  let log = env.log();
  assert_eq!(log, [
    "cc -Wall -Ilib -o src/main.o -c src/main.cpp",
    "cc -Wall -o bin/test src/main.o -Lbin -lsum",
  ]);
}

#[test]
fn failing_source_stops_before_later_sources_and_link() {
  let env = TestEnv::new();
  for src in ["a.cpp", "fail.cpp", "c.cpp"] {
    env.write_source(src);
  }

  let result = env
    .target()
    .out("bin", "prog")
    .unwrap()
    .src(["a.cpp", "fail.cpp", "c.cpp"])
    .build();

  match result {
    Err(BuildError::Compile { file, code, .. }) => {
      assert_eq!(file, "fail.cpp");
      assert_eq!(code, Some(1));
    }
    other => panic!("expected compile failure, got {other:?}"),
  }

  let log = env.log();
  assert_eq!(log.len(), 2, "only a.cpp and fail.cpp were attempted: {log:?}");
  assert!(log.iter().all(|line| line.contains(" -c ")), "no link invocation: {log:?}");
  assert!(env.exists("a.o"), "earlier objects are left on disk");
  assert!(!env.exists("c.o"));
  assert!(!env.exists("bin/prog"));
}

#[test]
fn sources_sharing_an_object_are_rejected_before_compiling() {
  let env = TestEnv::new();
  env.write_source("foo.c");
  env.write_source("foo.cpp");

  let result = env.target().out("bin", "prog").unwrap().src(["foo.c", "foo.cpp"]).build();

  match result {
    Err(BuildError::ObjectCollision { object, first, second }) => {
      assert_eq!(object, "foo.o");
      assert_eq!(first, "foo.c");
      assert_eq!(second, "foo.cpp");
    }
    other => panic!("expected object collision, got {other:?}"),
  }
  assert!(env.log().is_empty(), "nothing is compiled");
}

#[test]
fn failing_source_stops_before_archive() {
  let env = TestEnv::new();
  env.write_source("fail.cpp");

  let result = env.target().out("bin", "libx.a").unwrap().src(["fail.cpp"]).build_static_lib();

  assert!(matches!(result, Err(BuildError::Compile { .. })));
  assert!(env.log().iter().all(|line| line.starts_with("cc ")));
}

// =============================================================================
// Link / archive
// =============================================================================

#[test]
fn empty_out_dir_writes_into_working_directory() {
  let env = TestEnv::new();
  env.write_source("main.cpp");

  let target = env.target().out("", "prog").unwrap().src(["main.cpp"]).build().unwrap();

  assert_eq!(target.output_path(), "prog");
  assert!(env.exists("prog"));
  assert_eq!(env.log()[1], "cc -o prog main.o");
}

#[test]
fn out_dir_is_created_and_receives_artifact() {
  let env = TestEnv::new();
  env.write_source("main.cpp");
  std::fs::create_dir_all(env.work().join("existing")).unwrap();

  env.target().out("bin", "prog").unwrap().src(["main.cpp"]).build().unwrap();
  env.target().out("existing", "prog").unwrap().src(["main.cpp"]).build().unwrap();

  assert!(env.exists("bin/prog"));
  assert!(env.exists("existing/prog"));
}

#[test]
fn link_failure_is_reported() {
  let env = TestEnv::new();
  env.write_source("main.cpp");

  let result = env
    .target()
    .out("bin", "prog")
    .unwrap()
    .libs(["fail"])
    .src(["main.cpp"])
    .build();

  match result {
    Err(BuildError::Link { output, cmd, code }) => {
      assert_eq!(output, "bin/prog");
      assert!(cmd.ends_with("-lfail"));
      assert_eq!(code, Some(1));
    }
    other => panic!("expected link failure, got {other:?}"),
  }
}

#[test]
fn static_lib_contains_exactly_the_objects_regardless_of_flags() {
  let env = TestEnv::new();
  env.write_source("lib/a.cpp");
  env.write_source("lib/b.cpp");

  env
    .target()
    .out("bin", "libsum.a")
    .unwrap()
    .flags(["-Wall"])
    .lib_paths(["bin"])
    .libs(["m"])
    .src(["lib/a.cpp", "lib/b.cpp"])
    .build_static_lib()
    .unwrap();

  let archive = std::fs::read_to_string(env.work().join("bin/libsum.a")).unwrap();
  assert_eq!(archive.lines().collect::<Vec<_>>(), ["lib/a.o", "lib/b.o"]);

  let log = env.log();
  assert_eq!(log[2], "ar rcs bin/libsum.a lib/a.o lib/b.o");
  assert!(log[0].contains("-Wall"), "flags still reach the compiler");
}

#[test]
fn second_build_on_same_target_is_rejected() {
  let env = TestEnv::new();
  env.write_source("main.cpp");

  let target = env.target().out("", "prog").unwrap().src(["main.cpp"]).build().unwrap();
  let result = target.build_static_lib();

  assert!(matches!(result, Err(BuildError::AlreadyBuilt { .. })));
  assert_eq!(env.log().len(), 2);
}

// =============================================================================
// Export / clean
// =============================================================================

#[test]
fn exported_database_matches_records() {
  let env = TestEnv::new();
  env.write_source("a.cpp");
  env.write_source("b.cpp");

  let target = env
    .target()
    .out("bin", "prog")
    .unwrap()
    .src(["a.cpp", "b.cpp"])
    .build()
    .unwrap()
    .export_compile_commands()
    .unwrap();

  let content = std::fs::read_to_string(env.work().join(COMPILE_COMMANDS_FILE)).unwrap();
  let parsed: Vec<CompileCommand> = serde_json::from_str(&content).unwrap();
  assert_eq!(parsed, target.compile_commands());
}

#[test]
fn clean_removes_objects_but_not_artifact() {
  let env = TestEnv::new();
  env.write_source("a.cpp");
  env.write_source("b.cpp");

  let target = env
    .target()
    .out("bin", "prog")
    .unwrap()
    .src(["a.cpp", "b.cpp"])
    .build()
    .unwrap()
    .clean()
    .unwrap();

  assert!(!env.exists("a.o"));
  assert!(!env.exists("b.o"));
  assert!(env.exists("bin/prog"));
  assert!(env.exists("a.cpp"));
  assert_eq!(target.objects(), ["a.o", "b.o"]);
}
