// Buffers handed to scripts must be released once the script drops them.
// Their storage lives outside the engine heap, so this binary counts live
// bytes with its own global allocator.

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicUsize, Ordering};

use autoskip_scripting_host::{ByteBuffer, ScriptRuntime};

static LIVE: AtomicUsize = AtomicUsize::new(0);
static PEAK: AtomicUsize = AtomicUsize::new(0);

struct CountingAllocator;

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator;

fn track_alloc(size: usize) {
    let live = LIVE.fetch_add(size, Ordering::SeqCst) + size;
    PEAK.fetch_max(live, Ordering::SeqCst);
}

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        track_alloc(layout.size());
        System.alloc(layout)
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        track_alloc(layout.size());
        System.alloc_zeroed(layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        LIVE.fetch_sub(layout.size(), Ordering::SeqCst);
        track_alloc(new_size);
        System.realloc(ptr, layout, new_size)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        LIVE.fetch_sub(layout.size(), Ordering::SeqCst);
        System.dealloc(ptr, layout)
    }
}

const FRAME: usize = 1920 * 1080 * 4;
const FRAMES: usize = 100;

#[test]
fn test_discarded_frames_are_freed() {
    let runtime = ScriptRuntime::in_current_dir().unwrap();
    // Engine-side wrappers must not pile up either
    runtime.set_memory_limit(32 * 1024 * 1024);
    let context = runtime.create_context().unwrap();
    context
        .with_global(|global| {
            global.bind("_frame", || ByteBuffer(vec![0xAB; FRAME]))?;
            Ok(())
        })
        .unwrap();

    let baseline = LIVE.load(Ordering::SeqCst);
    PEAK.store(baseline, Ordering::SeqCst);

    let script = format!(
        "let n = 0; for (let i = 0; i < {FRAMES}; i++) {{ if (_frame().byteLength === {FRAME}) n++; }} n"
    );
    let frames: i32 = context.eval(&script).unwrap();
    assert_eq!(frames, FRAMES as i32);

    runtime.run_gc();
    let peak = PEAK.load(Ordering::SeqCst) - baseline;
    let retained = LIVE.load(Ordering::SeqCst).saturating_sub(baseline);

    // Allocated in total: FRAMES * FRAME (~800 MiB)
    assert!(peak < 4 * FRAME, "peak {peak} bytes over baseline");
    assert!(retained < FRAME, "{retained} bytes still live");
    assert!(runtime.memory_used() < 32 * 1024 * 1024);
}
