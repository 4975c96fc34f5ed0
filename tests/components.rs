use nug::dom::{Host, HostNode, MemoryHost};
use nug::{
    chunked_list, derive_chunks, div, span, text, writable, ChunkOptions, ComponentDef, ComponentProps,
    LifecycleState, Node, NugError, Prop, SubscribeOptions, Unsubscriber,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn setup() -> (Rc<RefCell<MemoryHost>>, Host, HostNode) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let memory = Rc::new(RefCell::new(MemoryHost::new()));
    let host = Host::new(memory.clone());
    let root = host.create_node("main");
    (memory, host, root)
}

#[test]
fn rebuild_leaves_no_residual_nodes() {
    let (memory, host, root) = setup();
    let n = writable(1);
    let view = ComponentDef::new(|n: &Prop<i32>| vec![text(n.get()).boxed()]).instantiate(n.clone().into());
    view.mount(&host, root, None).unwrap();
    let nodes_before = memory.borrow().len();
    let old_text = memory.borrow().children(root)[0];

    n.set(2);

    let memory = memory.borrow();
    assert_eq!(memory.text_content(root), "2");
    assert!(!memory.contains(old_text));
    assert_eq!(memory.len(), nodes_before);
}

struct BadgeProps {
    label: Prop<String>,
    count: Prop<usize>,
}

impl ComponentProps for BadgeProps {
    fn watch_props(&self, run: &Rc<dyn Fn()>, options: SubscribeOptions) -> Vec<Unsubscriber> {
        (self.label.clone(), self.count.clone()).watch_props(run, options)
    }
}

#[test]
fn struct_props_mix_plain_and_observable_values() {
    let (memory, host, root) = setup();
    let count = writable(0);
    let badge = ComponentDef::new(|props: &BadgeProps| {
        vec![
            span()
                .attr("class", "badge")
                .child(text(format!("{}: {}", props.label.get(), props.count.get())))
                .boxed(),
        ]
    });

    let view = badge.instantiate(BadgeProps {
        label: Prop::value("Inbox".to_string()),
        count: count.clone().into(),
    });
    view.mount(&host, root, None).unwrap();
    assert_eq!(view.subscription_count(), 1);

    count.set(4);
    assert_eq!(
        memory.borrow().inner_html(root),
        r#"<span class="badge">Inbox: 4</span>"#
    );
}

#[test]
fn sibling_components_keep_their_own_ranges() {
    let (memory, host, root) = setup();
    let left = writable("L".to_string());
    let right = writable("R".to_string());
    let def = ComponentDef::new(|s: &Prop<String>| vec![span().child(text(s.get())).boxed()]);

    let a = def.instantiate(left.clone().into());
    let b = def.instantiate(right.clone().into());
    a.mount(&host, root, None).unwrap();
    b.mount(&host, root, None).unwrap();

    left.set("L2".to_string());
    right.set("R2".to_string());
    left.set("L3".to_string());

    assert_eq!(memory.borrow().inner_html(root), "<span>L3</span><span>R2</span>");
}

#[test]
fn nested_components_are_destroyed_with_their_parent() {
    let (memory, host, root) = setup();
    let inner_value = writable(1);
    let outer_value = writable("outer".to_string());

    let inner_def = ComponentDef::new(|n: &Prop<i32>| vec![text(n.get()).boxed()]);
    let inner_value_clone = inner_value.clone();
    let outer = ComponentDef::new(move |label: &Prop<String>| {
        vec![
            div()
                .child(text(label.get()))
                .child(inner_def.instantiate(inner_value_clone.clone().into()))
                .boxed(),
        ]
    })
    .instantiate(outer_value.clone().into());

    outer.mount(&host, root, None).unwrap();
    assert_eq!(memory.borrow().text_content(root), "outer1");

    outer_value.set("again".to_string());
    inner_value.set(2);
    assert_eq!(memory.borrow().text_content(root), "again2");
    assert_eq!(inner_value.subscriber_count(), 1);

    outer.destroy().unwrap();
    assert_eq!(memory.borrow().len(), 1);
    assert_eq!(inner_value.subscriber_count(), 0);
    assert_eq!(outer_value.subscriber_count(), 0);
}

#[test]
fn lifecycle_violations_are_reported() {
    let (_memory, host, root) = setup();
    let view = ComponentDef::new(|_: &()| vec![text("static").boxed()]).instantiate(());

    assert!(matches!(
        view.update(),
        Err(NugError::InvalidLifecycleState { state: LifecycleState::Unmounted, .. })
    ));

    view.mount(&host, root, None).unwrap();
    view.update().unwrap();
    assert!(view.mount(&host, root, None).is_err());

    view.destroy().unwrap();
    let err = view.mount(&host, root, None).unwrap_err();
    assert_eq!(err.to_string(), "cannot mount a component that is destroyed");
}

#[test]
fn chunked_list_rebuilds_only_the_edited_chunk() {
    let (memory, host, root) = setup();
    let items = writable((0..9).collect::<Vec<u32>>());
    let chunks = derive_chunks(ChunkOptions::new(items.clone(), |n: &u32| *n, 3)).unwrap();

    let renders = Rc::new(Cell::new(0));
    let renders_clone = renders.clone();
    let item = ComponentDef::new(move |n: &Prop<u32>| {
        renders_clone.set(renders_clone.get() + 1);
        vec![span().child(text(n.get())).boxed()]
    });

    let list = chunked_list(chunks, item);
    list.mount(&host, root, None).unwrap();
    assert_eq!(renders.get(), 9);

    items.update(|all| {
        let mut next = all.clone();
        next[7] = 70;
        next
    });
    assert_eq!(renders.get(), 12);
    assert_eq!(memory.borrow().text_content(root), "0123456708");

    items.update(|all| all[..4].to_vec());
    assert_eq!(memory.borrow().text_content(root), "0123");
    assert_eq!(memory.borrow().find_all(root, "span").len(), 4);

    list.destroy().unwrap();
    assert_eq!(memory.borrow().len(), 1);
    assert_eq!(items.subscriber_count(), 0);
}
