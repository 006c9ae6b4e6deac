//! Integration tests for binary persistence of whole graphs.
//!
//! These tests build a small but realistic analysis graph (a component with
//! a folder/file tree and a package/class/method structure), push it through
//! save/load and verify that everything an analyzer relies on survives:
//! kinds, attributes, parents, ordered edge lists, payloads, filter flags
//! and interned strings.

use asgraph::{prelude::*, Result};

/// Builds the shared scenario graph and returns the interesting ids.
struct Scenario {
    factory: Factory,
    component: NodeId,
    folder: NodeId,
    file: NodeId,
    package: NodeId,
    class: NodeId,
    method: NodeId,
    helper: NodeId,
    parameter: NodeId,
    comment: NodeId,
}

fn build_scenario() -> Result<Scenario> {
    let mut factory = Factory::new();

    let component = factory.create_node(NodeKind::Component)?;
    let folder = factory.create_node(NodeKind::Folder)?;
    let file = factory.create_node(NodeKind::File)?;
    let package = factory.create_node(NodeKind::Package)?;
    let class = factory.create_node(NodeKind::Class)?;
    let method = factory.create_node(NodeKind::Method)?;
    let helper = factory.create_node(NodeKind::Method)?;
    let parameter = factory.create_node(NodeKind::Parameter)?;
    let comment = factory.create_node(NodeKind::Comment)?;

    let name = factory.intern("core");
    if let NodeAttrs::Component(attrs) = factory.attrs_mut(component)? {
        attrs.named.name = name;
        attrs.tlloc = 2048;
    }
    let name = factory.intern("src");
    if let NodeAttrs::Folder(attrs) = factory.attrs_mut(folder)? {
        attrs.named.name = name;
    }
    let name = factory.intern("widget.cpp");
    if let NodeAttrs::File(attrs) = factory.attrs_mut(file)? {
        attrs.named.name = name;
        attrs.loc = 310;
    }
    let name = factory.intern("Widget");
    let mangled = factory.intern("app::Widget");
    if let NodeAttrs::Class(attrs) = factory.attrs_mut(class)? {
        attrs.scope.member.named.name = name;
        attrs.scope.member.mangled_name = mangled;
        attrs.scope.member.language = LanguageKind::Cpp;
        attrs.scope.lloc = 180;
        attrs.class_kind = ClassKind::Class;
        attrs.object_size = 64;
    }
    let name = factory.intern("render");
    if let NodeAttrs::Method(attrs) = factory.attrs_mut(method)? {
        attrs.scope.member.named.name = name;
        attrs.method_kind = MethodKind::Normal;
        attrs.flags = MethodFlags::VIRTUAL;
        attrs.num_branches = 4;
        attrs.num_statements = 17;
    }
    let text = factory.intern("Draws the widget.");
    if let NodeAttrs::Comment(attrs) = factory.attrs_mut(comment)? {
        attrs.text = text;
    }

    factory.add_edge(folder, EdgeKind::FolderContainsFile, file)?;
    factory.add_edge(package, EdgeKind::ScopeHasMember, class)?;
    factory.add_edge(class, EdgeKind::ScopeHasMember, method)?;
    factory.add_edge(class, EdgeKind::ScopeHasMember, helper)?;
    factory.add_edge(method, EdgeKind::MethodHasParameter, parameter)?;
    factory.set_single(class, EdgeKind::ScopeHasAnchor, comment)?;
    factory.add_edge(class, EdgeKind::MemberBelongsTo, component)?;
    factory.add_edge_with(
        method,
        EdgeKind::MethodCalls,
        helper,
        EdgePayload::Call(CallKind::Virtual),
    )?;
    factory.add_edge_with(
        method,
        EdgeKind::MethodCalls,
        method,
        EdgePayload::Call(CallKind::Static),
    )?;

    Ok(Scenario {
        factory,
        component,
        folder,
        file,
        package,
        class,
        method,
        helper,
        parameter,
        comment,
    })
}

#[test]
fn kinds_attributes_and_parents_survive() -> Result<()> {
    let scenario = build_scenario()?;
    let restored = Factory::load(&scenario.factory.save()?)?;

    assert_eq!(restored.len(), scenario.factory.len());
    for id in [
        scenario.component,
        scenario.folder,
        scenario.file,
        scenario.package,
        scenario.class,
        scenario.method,
        scenario.helper,
        scenario.parameter,
        scenario.comment,
    ] {
        assert_eq!(restored.node_kind(id)?, scenario.factory.node_kind(id)?);
        assert_eq!(restored.parent(id)?, scenario.factory.parent(id)?);
        assert_eq!(restored.attrs(id)?, scenario.factory.attrs(id)?);
    }

    assert_eq!(restored.parent(scenario.file)?, scenario.folder);
    assert_eq!(restored.parent(scenario.method)?, scenario.class);
    assert_eq!(restored.parent(scenario.comment)?, scenario.class);
    Ok(())
}

#[test]
fn interned_names_resolve_after_a_reload() -> Result<()> {
    let scenario = build_scenario()?;
    let restored = Factory::load(&scenario.factory.save()?)?;

    let attrs = restored.attrs(scenario.class)?;
    let key = attrs.name().unwrap();
    assert_eq!(restored.strings().get(key), "Widget");

    if let NodeAttrs::Comment(comment) = restored.attrs(scenario.comment)? {
        assert_eq!(restored.strings().get(comment.text), "Draws the widget.");
    } else {
        panic!("wrong attribute variant after reload");
    }
    Ok(())
}

#[test]
fn edge_lists_keep_order_and_payloads() -> Result<()> {
    let scenario = build_scenario()?;
    let restored = Factory::load(&scenario.factory.save()?)?;

    let members: Vec<_> = restored
        .edge_targets(scenario.class, EdgeKind::ScopeHasMember)?
        .collect();
    assert_eq!(members, vec![scenario.method, scenario.helper]);

    let calls: Vec<_> = restored
        .edge_targets_with(scenario.method, EdgeKind::MethodCalls)?
        .collect();
    assert_eq!(
        calls,
        vec![
            (scenario.helper, EdgePayload::Call(CallKind::Virtual)),
            (scenario.method, EdgePayload::Call(CallKind::Static)),
        ]
    );

    assert_eq!(
        restored.single_target(scenario.class, EdgeKind::ScopeHasAnchor)?,
        scenario.comment
    );
    Ok(())
}

#[test]
fn filter_state_survives_and_keeps_hiding() -> Result<()> {
    let mut scenario = build_scenario()?;
    scenario.factory.set_filtered_subtree(scenario.method)?;

    let restored = Factory::load(&scenario.factory.save()?)?;
    assert!(restored.is_filtered(scenario.method));
    assert!(restored.is_filtered(scenario.parameter));
    assert!(!restored.is_filtered(scenario.class));

    let members: Vec<_> = restored
        .edge_targets(scenario.class, EdgeKind::ScopeHasMember)?
        .collect();
    assert_eq!(members, vec![scenario.helper]);
    Ok(())
}

#[test]
fn a_reloaded_graph_saves_identically() -> Result<()> {
    let scenario = build_scenario()?;
    let first = scenario.factory.save()?;
    let second = Factory::load(&first)?.save()?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn file_round_trip_through_a_mapped_load() -> Result<()> {
    let scenario = build_scenario()?;
    let path = std::env::temp_dir().join(format!("asgraph-it-{}.asg", std::process::id()));
    scenario.factory.save_file(&path)?;
    let restored = Factory::load_file(&path);
    std::fs::remove_file(&path).ok();

    let restored = restored?;
    assert_eq!(restored.len(), scenario.factory.len());
    assert_eq!(restored.node_kind(scenario.class)?, NodeKind::Class);
    Ok(())
}
