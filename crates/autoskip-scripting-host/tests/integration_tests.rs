// Integration tests for the scripting host

use autoskip_scripting_host::{
    field, ByteBuffer, EvalMode, Handle, Record, ScriptError, ScriptRuntime,
};
use std::cell::RefCell;
use std::fs;
use std::rc::Rc;
use std::time::{Duration, Instant};

fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(String) + 'static) {
    let lines = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&lines);
    (lines, move |text: String| sink.borrow_mut().push(text))
}

#[test]
fn test_add_scenario() {
    let runtime = ScriptRuntime::in_current_dir().unwrap();
    let context = runtime.create_context().unwrap();
    context
        .with_global(|global| global.bind("_add", |a: i32, b: i32| a + b).map(|_| ()))
        .unwrap();

    assert_eq!(context.eval::<i32>("_add(2,3)").unwrap(), 5);

    let err = context.eval::<i32>("_add(2)").unwrap_err();
    assert!(err.is_exception());
    assert!(
        err.to_string().starts_with("SyntaxError: _add(): Expected 2 argument, but received 1"),
        "{err}"
    );

    let caught: bool = context
        .eval("try { _add(1, 2, 3); false } catch (e) { e instanceof SyntaxError }")
        .unwrap();
    assert!(caught);
}

#[test]
fn test_timers_fire_by_deadline_not_registration() {
    let runtime = ScriptRuntime::in_current_dir().unwrap();
    let context = runtime.create_context().unwrap();
    let (lines, print) = recorder();
    context
        .with_global(|global| global.bind("_print", print).map(|_| ()))
        .unwrap();

    context
        .eval_text(
            "setTimeout(() => _print('A'), 50); setTimeout(() => _print('B'), 10);",
            "timers.js",
            EvalMode::Global,
        )
        .unwrap();

    let started = Instant::now();
    context.run_loop().unwrap();
    assert!(started.elapsed() >= Duration::from_millis(50));
    assert_eq!(*lines.borrow(), vec!["B".to_string(), "A".to_string()]);
}

#[test]
fn test_zero_delay_beats_earlier_longer_timer() {
    let runtime = ScriptRuntime::in_current_dir().unwrap();
    let context = runtime.create_context().unwrap();
    let (lines, print) = recorder();
    context
        .with_global(|global| global.bind("_print", print).map(|_| ()))
        .unwrap();

    context
        .eval_text(
            "setTimeout(() => _print('slow'), 20); setTimeout(() => _print('now'), 0); setTimeout(() => _print('negative'), -5);",
            "zero.js",
            EvalMode::Global,
        )
        .unwrap();
    context.run_loop().unwrap();
    assert_eq!(
        *lines.borrow(),
        vec!["now".to_string(), "negative".to_string(), "slow".to_string()]
    );
}

#[test]
fn test_set_timeout_validates_arguments() {
    let runtime = ScriptRuntime::in_current_dir().unwrap();
    let context = runtime.create_context().unwrap();

    let checks = [
        "setTimeout(() => {})",
        "setTimeout(42, 10)",
        "setTimeout(() => {}, 'soon')",
    ];
    for source in checks {
        let wrapped = format!("try {{ {source}; false }} catch (e) {{ e instanceof TypeError }}");
        assert!(context.eval::<bool>(&wrapped).unwrap(), "{source}");
    }
    assert_eq!(runtime.pending_timers(), 0);
}

#[test]
fn test_set_timeout_returns_sequential_ids() {
    let runtime = ScriptRuntime::in_current_dir().unwrap();
    let context = runtime.create_context().unwrap();
    let ids: String = context
        .eval("[setTimeout(() => {}, 0), setTimeout(() => {}, 0)].join(',')")
        .unwrap();
    assert_eq!(ids, "0,1");
    context.run_loop().unwrap();
}

#[test]
fn test_timer_exception_stops_loop_with_traceback() {
    let runtime = ScriptRuntime::in_current_dir().unwrap();
    let context = runtime.create_context().unwrap();
    let (lines, print) = recorder();
    context
        .with_global(|global| global.bind("_print", print).map(|_| ()))
        .unwrap();

    context
        .eval_text(
            "function explode() { throw new Error('timer failed'); }\n\
             setTimeout(explode, 1);\n\
             setTimeout(() => _print('after'), 30);",
            "explode.js",
            EvalMode::Global,
        )
        .unwrap();

    let err = context.run_loop().unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("Error: timer failed"), "{message}");
    assert!(message.contains("Traceback:"), "{message}");
    assert!(message.contains("explode"), "{message}");
    assert!(lines.borrow().is_empty());
    assert_eq!(runtime.pending_timers(), 1);
}

#[test]
fn test_missing_file_is_not_a_script_exception() {
    let dir = tempfile::tempdir().unwrap();
    let runtime = ScriptRuntime::new(dir.path()).unwrap();
    let context = runtime.create_context().unwrap();

    let err = context.eval_file("./script.js", EvalMode::Module).unwrap_err();
    assert!(matches!(err, ScriptError::Io { .. }));
    assert!(!err.is_exception());
    assert!(!err.to_string().contains("Traceback"));
}

#[test]
fn test_module_imports_resolve_from_importer() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("lib")).unwrap();
    fs::write(
        dir.path().join("lib/math.js"),
        "import { base } from '../config.js';\nexport const offset = (v) => v + base;\n",
    )
    .unwrap();
    fs::write(dir.path().join("config.js"), "export const base = 40;\n").unwrap();
    fs::write(
        dir.path().join("script.js"),
        "import { offset } from './lib/math.js';\n\
         globalThis.result = offset(2);\n\
         globalThis.url = import.meta.url;\n\
         globalThis.main = import.meta.main;\n",
    )
    .unwrap();

    let runtime = ScriptRuntime::new(dir.path()).unwrap();
    let context = runtime.create_context().unwrap();
    let (loaded, observer) = recorder();
    context.on_module_loaded(move |name| observer(name.to_string()));

    context.eval_file("script.js", EvalMode::Module).unwrap();
    context.run_loop().unwrap();

    assert_eq!(context.eval::<i32>("result").unwrap(), 42);
    assert!(context.eval::<bool>("main").unwrap());
    assert!(context.eval::<String>("url").unwrap().ends_with("/script.js"));

    let loaded = loaded.borrow();
    assert_eq!(loaded[0], "script.js");
    assert!(loaded.contains(&"lib/math.js".to_string()), "{loaded:?}");
    assert!(loaded.contains(&"config.js".to_string()), "{loaded:?}");
}

#[test]
fn test_import_meta_is_per_module() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("dep.js"),
        "export const meta = { url: import.meta.url, main: import.meta.main };\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("script.js"),
        "import { meta } from './dep.js';\n\
         globalThis.depMain = meta.main;\n\
         globalThis.depUrl = meta.url;\n\
         globalThis.ownUrl = import.meta.url;\n",
    )
    .unwrap();

    let runtime = ScriptRuntime::new(dir.path()).unwrap();
    let context = runtime.create_context().unwrap();
    context.eval_file("script.js", EvalMode::Module).unwrap();
    context.run_loop().unwrap();

    assert!(!context.eval::<bool>("depMain").unwrap());
    let dep_url: String = context.eval("depUrl").unwrap();
    assert!(dep_url.starts_with("file://"), "{dep_url}");
    assert!(dep_url.ends_with("/dep.js"), "{dep_url}");
    assert!(context.eval::<String>("ownUrl").unwrap().ends_with("/script.js"));
}

#[test]
fn test_hashbang_module_runs() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("tool.js"),
        "#!/usr/bin/env autoskip\nglobalThis.ranAsMain = import.meta.main;\n",
    )
    .unwrap();

    let runtime = ScriptRuntime::new(dir.path()).unwrap();
    let context = runtime.create_context().unwrap();
    context.eval_file("tool.js", EvalMode::Module).unwrap();
    context.run_loop().unwrap();

    assert!(context.eval::<bool>("ranAsMain").unwrap());
}

#[test]
fn test_traceback_columns_match_source() {
    let dir = tempfile::tempdir().unwrap();
    let line = "export function boom() { throw new Error('boom') }";
    fs::write(dir.path().join("b.js"), format!("{line}\n")).unwrap();
    fs::write(
        dir.path().join("script.js"),
        "import { boom } from './b.js';\nboom();\n",
    )
    .unwrap();

    let runtime = ScriptRuntime::new(dir.path()).unwrap();
    let context = runtime.create_context().unwrap();
    let err = context.eval_file("script.js", EvalMode::Module).unwrap_err();
    let message = err.to_string();

    let at = message.find("b.js:1:").expect("frame for b.js line 1");
    let column: usize = message[at + "b.js:1:".len()..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .unwrap();
    assert!(column >= 1 && column <= line.len(), "column {column} in {message}");
}

#[test]
fn test_top_level_await_waits_for_timers() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("script.js"),
        "const sleep = (ms) => new Promise((resolve) => setTimeout(resolve, ms));\n\
         globalThis.steps = [];\n\
         steps.push('start');\n\
         await sleep(5);\n\
         steps.push('end');\n",
    )
    .unwrap();

    let runtime = ScriptRuntime::new(dir.path()).unwrap();
    let context = runtime.create_context().unwrap();
    context.eval_file("script.js", EvalMode::Module).unwrap();
    context.run_loop().unwrap();
    assert_eq!(context.eval::<String>("steps.join(',')").unwrap(), "start,end");
}

#[test]
fn test_rejection_after_top_level_await_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("script.js"),
        "await new Promise((resolve) => setTimeout(resolve, 1));\n\
         throw new RangeError('late failure');\n",
    )
    .unwrap();

    let runtime = ScriptRuntime::new(dir.path()).unwrap();
    let context = runtime.create_context().unwrap();
    context.eval_file("script.js", EvalMode::Module).unwrap();
    let err = context.run_loop().unwrap_err();
    assert!(err.to_string().starts_with("RangeError: late failure"), "{err}");
}

#[test]
fn test_round_trips_through_script() {
    let runtime = ScriptRuntime::in_current_dir().unwrap();
    let context = runtime.create_context().unwrap();
    context
        .with_global(|global| {
            global
                .bind("_i32", |v: i32| v)?
                .bind("_u32", |v: u32| v)?
                .bind("_i64", |v: i64| v)?
                .bind("_u64", |v: u64| v)?
                .bind("_str", |v: String| v)?
                .bind("_handle", |v: Handle| v)?;
            Ok(())
        })
        .unwrap();

    let checks = [
        "_i32(0) === 0",
        "_i32(-1) === -1",
        "_i32(2147483647) === 2147483647",
        "_i32(-2147483648) === -2147483648",
        "_u32(4294967295) === 4294967295",
        "_i64(-9223372036854775808n) === -9223372036854775808n",
        "_u64(18446744073709551615n) === 18446744073709551615n",
        "_str('') === ''",
        "_str('héllo ✓') === 'héllo ✓'",
        "_handle(0n) === 0n",
        "_i32(undefined) === 0",
        "_i32(null) === 0",
        "_i32(new Number(5)) === 5",
        "_i32('0x10') === 16",
        "_u32(-1) === 4294967295",
        "_u64(2 ** 64 - 2048) === 18446744073709549568n",
        "_i64(2 ** 63) === -9223372036854775808n",
    ];
    for check in checks {
        assert!(context.eval::<bool>(check).unwrap(), "{check}");
    }

    let message: String = context
        .eval("try { _i32(Symbol('s')); '' } catch (e) { e.message }")
        .unwrap();
    assert_eq!(message, "_i32(): The argument0 cannot be converted to Int32");
}

#[test]
fn test_records_and_buffers_reach_script() {
    let runtime = ScriptRuntime::in_current_dir().unwrap();
    let context = runtime.create_context().unwrap();
    context
        .with_global(|global| {
            global.bind("_capture", |width: i32, height: i32| {
                let step = width * 4;
                Record((
                    field("width", width),
                    field("height", height),
                    field("channels", 4i32),
                    field("step", step),
                    field("data", ByteBuffer(vec![0u8; (step * height) as usize])),
                ))
            })?;
            Ok(())
        })
        .unwrap();

    let summary: String = context
        .eval("const img = _capture(3, 2); [Object.keys(img).join(','), img.data.byteLength].join('|')")
        .unwrap();
    assert_eq!(summary, "width,height,channels,step,data|24");
}
