use std::fs;
use std::path::Path;

use anyhow::Result;
use doxystub::{ApiIndex, MemberKind, load_directory};

const FOOTSTEP_XML: &str = r#"<?xml version='1.0' encoding='UTF-8'?>
<doxygen version="1.9.1">
  <compounddef id="classplaco_1_1Footstep" kind="class">
    <compoundname>placo::Footstep</compoundname>
    <briefdescription><para>A footstep is a single support pose.</para></briefdescription>
    <sectiondef kind="public-func">
      <memberdef kind="function" id="classplaco_1_1Footstep_1a1">
        <type>Eigen::Affine3d</type>
        <name>frame</name>
      </memberdef>
      <memberdef kind="function" id="classplaco_1_1Footstep_1a2">
        <type>std::vector&lt;Eigen::Vector3d&gt;</type>
        <name>support_polygon</name>
      </memberdef>
    </sectiondef>
    <listofallmembers>
      <member refid="classplaco_1_1Footstep_1a1"><name>frame</name></member>
      <member refid="classplaco_1_1Footstep_1a2"><name>support_polygon</name></member>
      <member refid="inherited_1missing"><name>clone</name></member>
    </listofallmembers>
  </compounddef>
</doxygen>
"#;

const ROBOT_XML: &str = r#"<?xml version='1.0' encoding='UTF-8'?>
<doxygen version="1.9.1">
  <compounddef id="classplaco_1_1HumanoidRobot" kind="class">
    <compoundname>placo::HumanoidRobot</compoundname>
    <briefdescription><para>Rigid-body model of a humanoid.</para></briefdescription>
    <sectiondef kind="public-func">
      <memberdef kind="function" id="classplaco_1_1HumanoidRobot_1a1">
        <type><ref refid="namespaceplaco_1aconfig" kindref="member">Configuration</ref></type>
        <name>configuration</name>
      </memberdef>
      <memberdef kind="function" id="classplaco_1_1HumanoidRobot_1a2">
        <type><ref refid="classplaco_1_1Footstep" kindref="compound">Footstep</ref></type>
        <name>support_footstep</name>
        <param>
          <type>const std::string&amp;</type>
          <declname>frame_name</declname>
        </param>
        <param>
          <type>some_unknown_t&amp;</type>
          <declname>opaque</declname>
        </param>
      </memberdef>
      <memberdef kind="variable" id="classplaco_1_1HumanoidRobot_1a3">
        <type>double</type>
        <name>mass</name>
      </memberdef>
    </sectiondef>
    <listofallmembers>
      <member refid="classplaco_1_1HumanoidRobot_1a1"><name>configuration</name></member>
      <member refid="classplaco_1_1HumanoidRobot_1a2"><name>support_footstep</name></member>
      <member refid="classplaco_1_1HumanoidRobot_1a3"><name>mass</name></member>
    </listofallmembers>
  </compounddef>
</doxygen>
"#;

const TYPES_XML: &str = r#"<?xml version='1.0' encoding='UTF-8'?>
<doxygen version="1.9.1">
  <compounddef id="namespaceplaco" kind="namespace">
    <compoundname>placo</compoundname>
    <sectiondef kind="typedef">
      <memberdef kind="typedef" id="namespaceplaco_1aconfig">
        <type>Eigen::VectorXd</type>
        <name>Configuration</name>
      </memberdef>
    </sectiondef>
    <sectiondef kind="func">
      <memberdef kind="function" id="namespaceplaco_1a1">
        <type>double</type>
        <name>wrap_angle</name>
        <param>
          <type>double</type>
          <declname>angle</declname>
        </param>
      </memberdef>
    </sectiondef>
  </compounddef>
</doxygen>
"#;

fn write_tree(root: &Path, files: &[(&str, &str)]) -> Result<()> {
    let xml_dir = root.join("xml");
    fs::create_dir_all(&xml_dir)?;
    for (name, content) in files {
        fs::write(xml_dir.join(name), content)?;
    }
    Ok(())
}

fn sample_tree() -> Result<tempfile::TempDir> {
    let dir = tempfile::Builder::new().prefix("doxystub-test").tempdir()?;
    write_tree(
        dir.path(),
        &[
            ("footstep.xml", FOOTSTEP_XML),
            ("robot.xml", ROBOT_XML),
            ("types.xml", TYPES_XML),
        ],
    )?;
    Ok(dir)
}

#[test]
fn typedefs_resolve_across_files() -> Result<()> {
    let dir = sample_tree()?;
    let index = load_directory(dir.path())?;

    // robot.xml references a typedef that only appears in types.xml, which
    // sorts after it; the phase barrier makes the forward reference resolve.
    let members = index.members("placo::HumanoidRobot").expect("known compound");
    let configuration = members.get("configuration").expect("member resolved");
    assert_eq!(configuration.ty.as_deref(), Some("numpy.ndarray"));
    Ok(())
}

#[test]
fn compound_references_rewrite_to_qualified_names() -> Result<()> {
    let dir = sample_tree()?;
    let index = load_directory(dir.path())?;

    let members = index.members("placo::HumanoidRobot").expect("known compound");
    let footstep = members.get("support_footstep").expect("member resolved");
    assert_eq!(footstep.ty.as_deref(), Some("placo::Footstep"));
    assert_eq!(footstep.params[0].ty.as_deref(), Some("str"));
    Ok(())
}

#[test]
fn container_types_rewrite_recursively() -> Result<()> {
    let dir = sample_tree()?;
    let index = load_directory(dir.path())?;

    let members = index.members("placo::Footstep").expect("known compound");
    let polygon = members.get("support_polygon").expect("member resolved");
    assert_eq!(polygon.ty.as_deref(), Some("list[numpy.ndarray]"));
    Ok(())
}

#[test]
fn unknown_spellings_degrade_to_sanitized_placeholders() -> Result<()> {
    let dir = sample_tree()?;
    let index = load_directory(dir.path())?;

    let members = index.members("placo::HumanoidRobot").expect("known compound");
    let footstep = members.get("support_footstep").expect("member resolved");
    assert_eq!(footstep.params[1].ty.as_deref(), Some("some_unknown_t"));

    let fallbacks: Vec<_> = index.fallback_spellings().collect();
    assert_eq!(fallbacks, ["some_unknown_t&"]);
    Ok(())
}

#[test]
fn namespace_members_are_recorded_directly() -> Result<()> {
    let dir = sample_tree()?;
    let index = load_directory(dir.path())?;

    let members = index.members("placo").expect("known namespace");
    let wrap_angle = members.get("wrap_angle").expect("member resolved");
    assert_eq!(wrap_angle.kind, MemberKind::Function);
    assert_eq!(wrap_angle.ty.as_deref(), Some("float"));
    // The typedef feeds the alias table instead of the member map.
    assert!(!members.contains_key("Configuration"));
    Ok(())
}

#[test]
fn unresolvable_member_ids_are_omitted() -> Result<()> {
    let dir = sample_tree()?;
    let index = load_directory(dir.path())?;

    let members = index.members("placo::Footstep").expect("known compound");
    assert!(!members.contains_key("clone"));
    assert_eq!(members.len(), 2);
    Ok(())
}

#[test]
fn unknown_compounds_return_none_from_both_accessors() -> Result<()> {
    let dir = sample_tree()?;
    let index = load_directory(dir.path())?;

    assert!(index.metadata("placo::DoesNotExist").is_none());
    assert!(index.members("placo::DoesNotExist").is_none());
    Ok(())
}

#[test]
fn malformed_files_are_isolated() -> Result<()> {
    let dir = sample_tree()?;
    fs::write(
        dir.path().join("xml").join("broken.xml"),
        "<doxygen><compounddef",
    )?;

    let index = load_directory(dir.path())?;

    assert_eq!(index.parse_failures().len(), 1);
    assert!(
        index.parse_failures()[0]
            .0
            .ends_with(Path::new("broken.xml"))
    );
    // The remaining files still contribute their compounds.
    assert!(index.metadata("placo::HumanoidRobot").is_some());
    assert!(index.metadata("placo::Footstep").is_some());
    Ok(())
}

#[test]
fn runs_over_identical_input_are_identical() -> Result<()> {
    let dir = sample_tree()?;
    let first = load_directory(dir.path())?;
    let second = load_directory(dir.path())?;

    assert_eq!(snapshot(&first), snapshot(&second));
    Ok(())
}

#[test]
fn empty_documentation_roots_produce_empty_indexes() -> Result<()> {
    let dir = tempfile::Builder::new().prefix("doxystub-test").tempdir()?;
    let index = load_directory(dir.path())?;

    assert_eq!(index.compound_names().count(), 0);
    assert!(index.parse_failures().is_empty());
    Ok(())
}

fn snapshot(index: &ApiIndex) -> Vec<serde_json::Value> {
    index
        .compound_names()
        .map(|name| {
            serde_json::json!({
                "metadata": index.metadata(name),
                "members": index.members(name),
            })
        })
        .collect()
}
