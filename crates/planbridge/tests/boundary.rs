//! Concurrency contract of the boundary: host calls never interleave, even
//! when the engine side invokes adapted callables from many threads at once.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use planbridge::{Bridge, HostCallable, HostClass, HostMember, HostRef, Value};

#[test]
fn test_host_calls_are_serialized_across_threads() {
    let bridge = Bridge::new();

    // Every host call bumps the in-flight counter on entry and drops it on
    // exit; observing more than one in flight means two host calls ran
    // concurrently.
    let in_flight = Arc::new(AtomicUsize::new(0));
    let violated = Arc::new(AtomicBool::new(false));

    let adapter = {
        let in_flight = Arc::clone(&in_flight);
        let violated = Arc::clone(&violated);
        bridge
            .native_fn1(HostCallable::unary("probe", move |v| {
                if in_flight.fetch_add(1, Ordering::SeqCst) != 0 {
                    violated.store(true, Ordering::SeqCst);
                }
                thread::sleep(Duration::from_micros(200));
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(v)
            }))
            .unwrap()
    };

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let adapter = adapter.clone();
            thread::spawn(move || {
                for i in 0..50 {
                    let out = adapter.apply(Value::I64(t * 1000 + i)).unwrap();
                    assert_eq!(out, Value::I64(t * 1000 + i));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert!(
        !violated.load(Ordering::SeqCst),
        "two host calls were in flight at once"
    );
}

#[test]
fn test_attribute_access_is_serialized_with_callables() {
    let bridge = Bridge::new();
    let class = Arc::new(HostClass::new("Counter", vec![HostMember::new("n")]));
    let obj = HostRef::of_class(class);
    obj.set("n", Value::I64(0)).unwrap();
    let id = bridge.wrap_object(&obj).as_proxy().unwrap();

    // Read-modify-write through a host callable. Without boundary
    // serialization the increments would race and drop updates.
    let increment = {
        let bridge = Arc::clone(&bridge);
        let reentrant = Arc::clone(&bridge);
        bridge
            .native_fn1(HostCallable::unary("increment", move |v| {
                let id = v.as_proxy().unwrap();
                let n = reentrant.get_attribute(id, "n")?.as_i64().unwrap();
                reentrant.set_attribute(id, "n", Value::I64(n + 1))?;
                Ok(Value::None)
            }))
            .unwrap()
    };

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let increment = increment.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    increment.apply(Value::Proxy(id)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(obj.get("n").unwrap(), Value::I64(400));
}
