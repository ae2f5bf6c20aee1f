//! Tool Router - builds the rmcp ToolRouter from the enabled toolsets.

use std::sync::Arc;

use rmcp::handler::server::tool::{ToolRoute, ToolRouter};

use super::context::ToolContext;
use super::definitions::{controller, docs, eda, galaxy, lint};
use crate::core::config::Toolset;

/// Build the tool router with every tool of every enabled toolset.
pub fn build_tool_router<S>(ctx: &Arc<ToolContext>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    ctx.config()
        .toolsets
        .iter()
        .flat_map(|toolset| toolset_routes::<S>(*toolset, ctx))
        .fold(ToolRouter::new(), |router, route| router.with_route(route))
}

fn toolset_routes<S>(toolset: Toolset, ctx: &Arc<ToolContext>) -> Vec<ToolRoute<S>>
where
    S: Send + Sync + 'static,
{
    match toolset {
        Toolset::Controller => controller::routes(ctx),
        Toolset::Eda => eda::routes(ctx),
        Toolset::Galaxy => galaxy::routes(ctx),
        Toolset::Lint => lint::routes(ctx),
        Toolset::Docs => docs::routes(ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::super::registry::ToolRegistry;
    use super::*;
    use crate::core::config::Config;

    struct TestServer {}

    fn context(toolsets: Vec<Toolset>) -> Arc<ToolContext> {
        let config = Config {
            toolsets,
            ..Config::default()
        };
        Arc::new(ToolContext::new(Arc::new(config)))
    }

    #[test]
    fn test_build_router() {
        let router: ToolRouter<TestServer> = build_tool_router(&context(Toolset::ALL.to_vec()));
        let tools = router.list_all();
        assert_eq!(tools.len(), 15 + 10 + 5 + 9 + 9);

        let names: Vec<_> = tools.iter().map(|t| t.name.as_ref()).collect();
        assert!(names.contains(&"list_inventories"));
        assert!(names.contains(&"run_job"));
        assert!(names.contains(&"list_activations"));
        assert!(names.contains(&"search_collections"));
        assert!(names.contains(&"lint_playbook"));
        assert!(names.contains(&"read_documentation"));
        assert!(names.contains(&"search_documentation_enhanced"));
    }

    #[test]
    fn test_disabled_toolsets_are_not_routed() {
        let router: ToolRouter<TestServer> =
            build_tool_router(&context(vec![Toolset::Galaxy, Toolset::Lint]));
        let names: Vec<String> = router
            .list_all()
            .iter()
            .map(|t| t.name.to_string())
            .collect();
        assert_eq!(names.len(), 5 + 9);
        assert!(names.iter().any(|n| n == "install_command"));
        assert!(!names.iter().any(|n| n == "run_job"));
        assert!(!names.iter().any(|n| n == "check_domain"));
    }

    #[test]
    fn test_registry_matches_router() {
        let ctx = context(Toolset::ALL.to_vec());
        let registry = ToolRegistry::new(ctx.clone());
        let registry_names = registry.tool_names();

        let router: ToolRouter<TestServer> = build_tool_router(&ctx);
        let router_tools = router.list_all();
        let router_names: Vec<_> = router_tools.iter().map(|t| t.name.as_ref()).collect();

        assert_eq!(registry_names.len(), router_names.len());
        for name in registry_names {
            assert!(router_names.contains(&name));
        }
    }
}
