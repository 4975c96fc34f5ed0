use nug::{derived, get, readable, writable, Observable, SubscribeOptions, Writable};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn recorder<T: Clone + 'static>() -> (Rc<RefCell<Vec<T>>>, impl Fn(&T) + 'static) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    (seen, move |value: &T| sink.borrow_mut().push(value.clone()))
}

#[test]
fn late_subscribers_see_the_latest_set() {
    let store = writable(0);
    for i in 1..=5 {
        store.set(i);
        let (seen, record) = recorder();
        let unsubscribe = store.subscribe(record);
        assert_eq!(*seen.borrow(), vec![i]);
        unsubscribe.unsubscribe();
    }
}

#[test]
fn readable_delivers_construction_value() {
    let store = readable("fixed");
    let (seen, record) = recorder();
    let _unsubscribe = store.subscribe(record);
    assert_eq!(*seen.borrow(), vec!["fixed"]);
    assert_eq!(get(&store), "fixed");
}

#[test]
fn get_leaves_no_subscription_behind() {
    let store = writable(vec![1, 2]);
    assert_eq!(get(&store), vec![1, 2]);
    assert_eq!(store.subscriber_count(), 0);
}

#[test]
fn notifications_follow_subscription_order() {
    let store = writable(0);
    let order = Rc::new(RefCell::new(Vec::new()));
    let mut handles = Vec::new();
    for id in 0..3 {
        let order = order.clone();
        handles.push(store.subscribe_with(
            Rc::new(move |_: &i32| order.borrow_mut().push(id)),
            SubscribeOptions::skip_initial(),
        ));
    }

    store.set(1);
    assert_eq!(*order.borrow(), vec![0, 1, 2]);
}

#[test]
fn unsubscribed_callbacks_never_run_again() {
    let store = writable(0);
    let (seen, record) = recorder();
    let unsubscribe = store.subscribe(record);

    store.set(1);
    unsubscribe.unsubscribe();
    unsubscribe.unsubscribe();
    store.set(2);

    assert_eq!(*seen.borrow(), vec![0, 1]);
    assert!(unsubscribe.is_released());
}

#[test]
fn same_callback_twice_registers_twice() {
    let store = writable(0);
    let calls = Rc::new(Cell::new(0));
    let calls_clone = calls.clone();
    let callback: Rc<dyn Fn(&i32)> = Rc::new(move |_| calls_clone.set(calls_clone.get() + 1));

    let first = store.subscribe_with(callback.clone(), SubscribeOptions::skip_initial());
    let _second = store.subscribe_with(callback, SubscribeOptions::skip_initial());
    store.set(1);
    assert_eq!(calls.get(), 2);

    first.unsubscribe();
    store.set(2);
    assert_eq!(calls.get(), 3);
}

#[test]
fn subscribers_added_during_a_pass_wait_for_the_next_one() {
    let store = writable(0);
    let late_calls = Rc::new(Cell::new(0));
    let late_handles = Rc::new(RefCell::new(Vec::new()));

    let store_clone = store.clone();
    let late_calls_clone = late_calls.clone();
    let late_handles_clone = late_handles.clone();
    let _adder = store.subscribe_with(
        Rc::new(move |_: &i32| {
            let calls = late_calls_clone.clone();
            late_handles_clone.borrow_mut().push(store_clone.subscribe_with(
                Rc::new(move |_: &i32| calls.set(calls.get() + 1)),
                SubscribeOptions::skip_initial(),
            ));
        }),
        SubscribeOptions::skip_initial(),
    );

    store.set(1);
    assert_eq!(late_calls.get(), 0);
    store.set(2);
    assert_eq!(late_calls.get(), 1);
}

#[test]
fn nested_set_runs_its_own_complete_pass() {
    let store = writable(0);
    let log = Rc::new(RefCell::new(Vec::new()));

    let store_clone = store.clone();
    let log_a = log.clone();
    let _a = store.subscribe_with(
        Rc::new(move |value: &i32| {
            log_a.borrow_mut().push(format!("a{value}"));
            if *value == 1 {
                store_clone.set(2);
            }
        }),
        SubscribeOptions::skip_initial(),
    );
    let log_b = log.clone();
    let _b = store.subscribe_with(
        Rc::new(move |value: &i32| log_b.borrow_mut().push(format!("b{value}"))),
        SubscribeOptions::skip_initial(),
    );

    store.set(1);
    assert_eq!(*log.borrow(), vec!["a1", "a2", "b2", "b2"]);
    assert_eq!(store.get(), 2);
}

#[test]
fn derived_reads_fresh_values_from_every_input() {
    let a = writable(1);
    let b = writable(10);
    let c = writable(100);
    let sum = derived((a.clone(), b.clone(), c.clone()), |(a, b, c)| a + b + c);

    a.set(2);
    assert_eq!(sum.get(), 112);
    c.set(200);
    assert_eq!(sum.get(), 212);
}

#[test]
fn derived_notifies_even_when_value_is_unchanged() {
    let input = writable(3);
    let parity = derived((input.clone(),), |(n,)| n % 2);
    let (seen, record) = recorder();
    let _unsubscribe = parity.subscribe(record);

    input.set(5);
    input.set(7);
    assert_eq!(*seen.borrow(), vec![1, 1, 1]);
}

#[test]
fn derived_construction_does_not_notify_inputs_subscribers() {
    let input = writable(1);
    let (seen, record) = recorder();
    let _watch = input.subscribe(record);

    let calls = Rc::new(Cell::new(0));
    let calls_clone = calls.clone();
    let _doubled = derived((input.clone(),), move |(n,)| {
        calls_clone.set(calls_clone.get() + 1);
        n * 2
    });

    assert_eq!(calls.get(), 1);
    assert_eq!(*seen.borrow(), vec![1]);
}

#[test]
fn derived_over_a_vec_of_stores() {
    let stores: Vec<Writable<u32>> = (1..=4).map(writable).collect();
    let total = derived(stores.clone(), |values| values.iter().sum::<u32>());
    assert_eq!(total.get(), 10);

    stores[3].set(40);
    assert_eq!(total.get(), 46);
}

#[test]
fn derived_chains_settle_before_set_returns() {
    let base = writable(2);
    let squared = derived((base.clone(),), |(n,)| n * n);
    let label = derived((squared.clone(), base.clone()), |(sq, n)| format!("{n}^2={sq}"));

    base.set(3);
    assert_eq!(label.get(), "3^2=9");
}

#[test]
fn destroyed_derived_freezes() {
    let input = writable(1);
    let doubled = derived((input.clone(),), |(n,)| n * 2);
    doubled.destroy();
    doubled.destroy();

    input.set(5);
    assert_eq!(doubled.get(), 2);
    assert_eq!(input.subscriber_count(), 0);
}

#[test]
fn reentrant_set_leaves_every_dependent_consistent() {
    let base = writable(0);
    let mirror = Rc::new(Cell::new(-1));
    let derived_mirror = Rc::new(Cell::new(-1));

    // Registered before the derived store, so its nested set runs first.
    let base_clone = base.clone();
    let _clamp = base.subscribe(move |n: &i32| {
        if *n > 3 {
            base_clone.set(3);
        }
    });
    let doubled = derived((base.clone(),), |(n,)| n * 2);
    let label = derived((doubled.clone(), base.clone()), |(d, n)| format!("{n}x2={d}"));

    let mirror_clone = mirror.clone();
    let _mirror = base.subscribe(move |n: &i32| mirror_clone.set(*n));
    let derived_mirror_clone = derived_mirror.clone();
    let _derived_mirror = doubled.subscribe(move |d: &i32| derived_mirror_clone.set(*d));

    base.set(10);

    assert_eq!(base.get(), 3);
    assert_eq!(mirror.get(), 3);
    assert_eq!(doubled.get(), 6);
    assert_eq!(derived_mirror.get(), 6);
    assert_eq!(label.get(), "3x2=6");
}
