use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

use route_scaffold::config::{Overrides, ProjectConfig};
use route_scaffold::error::{ConfigError, GenerateError};
use route_scaffold::generate::generate_routes;

const ROUTES: &str = r#"import { loginPath } from '@/access'
import { defineComponent } from 'vue'
import Login from '@/pages/Login'
import { DashboardOutlined, SettingOutlined } from '@ant-design/icons-vue'

export interface RouteProps {
  path?: string
  icon?: any
  component?: any
  routes?: RouteProps[]
  access?: string
  [key: string]: any
}

// ルート一覧
const routes: RouteProps[] = [
  {
    name: '登录',
    path: loginPath,
    layout: 'passport',
    component: Login,
  },
  {
    name: '用户列表',
    path: '/users/list',
    icon: <DashboardOutlined />,
    access: 'users',
    component: '/users/list',
    table: true,
    service: true,
  },
  {
    name: '用户详情',
    path: '/users/detail',
    hideInMenu: true,
    component: '/users/detail',
  },
  {
    name: '设置',
    path: '/setting',
    icon: <SettingOutlined />,
    component: '/setting',
    routes: [
      {
        name: '用户设置',
        path: '/setting/user',
        component: '/user',
        routes: [
          {
            name: '安全',
            path: '/setting/user/security',
            component: '/security',
          },
        ],
      },
      {
        path: '/setting/inline',
        name: '内联',
        component: defineComponent(() => () => {
          return (
            <span>2332</span>
          )
        }),
      },
    ],
  },
]

export default routes
"#;

struct Project {
    _tmp: TempDir,
    root: PathBuf,
}

impl Project {
    fn new(routes: &str) -> Self {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().to_path_buf();
        fs::write(root.join("package.json"), r#"{ "name": "demo" }"#).unwrap();
        fs::create_dir_all(root.join("src/routes")).unwrap();
        fs::write(root.join("src/routes/index.tsx"), routes).unwrap();
        Project { _tmp: tmp, root }
    }

    fn config(&self) -> ProjectConfig {
        ProjectConfig::load(&self.root, &Overrides::default()).unwrap()
    }

    fn routes(&self) -> String {
        fs::read_to_string(self.root.join("src/routes/index.tsx")).unwrap()
    }

    fn page(&self, rel: &str) -> PathBuf {
        self.root.join("src/pages").join(rel)
    }
}

fn all_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

#[test]
fn generates_pages_and_rewrites_route_file() {
    let project = Project::new(ROUTES);
    let report = generate_routes(&project.config()).unwrap();

    assert!(report.routes_updated);
    assert_eq!(
        report.imports_added,
        vec![
            "import UsersList from '@/pages/users/list'".to_string(),
            "import UsersDetail from '@/pages/users/detail'".to_string(),
            "import Setting from '@/pages/setting'".to_string(),
            "import SettingUser from '@/pages/setting/user'".to_string(),
            "import SettingUserSecurity from '@/pages/setting/user/security'".to_string(),
        ]
    );

    // 表形式 + service
    let list = fs::read_to_string(project.page("users/list/index.tsx")).unwrap();
    assert!(list.contains("// @page 用户列表"));
    assert!(list.contains("const List = defineComponent"));
    assert!(list.contains("IntegrationTable"));
    assert!(project.page("users/list/service.tsx").is_file());

    // 空テンプレート, service なし
    let detail = fs::read_to_string(project.page("users/detail/index.tsx")).unwrap();
    assert!(detail.contains("const Detail = defineComponent"));
    assert!(!detail.contains("IntegrationTable"));
    assert!(!project.page("users/detail/service.tsx").exists());

    let rewritten = project.routes();
    assert!(rewritten.contains(
        "import { DashboardOutlined, SettingOutlined } from '@ant-design/icons-vue'\n\
         import UsersList from '@/pages/users/list'\n\
         import UsersDetail from '@/pages/users/detail'\n\
         import Setting from '@/pages/setting'\n\
         import SettingUser from '@/pages/setting/user'\n\
         import SettingUserSecurity from '@/pages/setting/user/security'\n\
         \n\
         export interface RouteProps"
    ));
    assert!(rewritten.contains("    component: UsersList,\n"));
    assert!(rewritten.contains("        component: SettingUser,\n"));
    assert!(rewritten.contains("            component: SettingUserSecurity,\n"));
    assert!(!rewritten.contains("component: '"));
    assert!(rewritten.contains("<span>2332</span>"));
}

#[test]
fn directives_are_stripped_and_other_fields_kept_verbatim() {
    let project = Project::new(ROUTES);
    generate_routes(&project.config()).unwrap();
    let rewritten = project.routes();

    assert!(!rewritten.contains("table:"));
    assert!(!rewritten.contains("service:"));
    assert!(!rewritten.contains("cover:"));

    let expected_entry = r#"  {
    name: '用户列表',
    path: '/users/list',
    icon: <DashboardOutlined />,
    access: 'users',
    component: UsersList,
  },"#;
    assert!(rewritten.contains(expected_entry), "{rewritten}");

    // ルート配列より後ろはそのまま
    assert!(rewritten.ends_with("]\n\nexport default routes\n"));
}

#[test]
fn nested_children_are_scaffolded_under_parent_directory() {
    let project = Project::new(ROUTES);
    generate_routes(&project.config()).unwrap();

    assert!(project.page("setting/index.tsx").is_file());
    assert!(project.page("setting/user/index.tsx").is_file());
    assert!(project.page("setting/user/security/index.tsx").is_file());
    assert!(!project.page("user").exists());
    assert!(!project.page("security").exists());
}

#[test]
fn second_run_is_a_no_op() {
    let project = Project::new(ROUTES);
    generate_routes(&project.config()).unwrap();

    let routes_after_first = project.routes();
    let files_after_first = all_files(&project.root.join("src/pages"));

    let second = generate_routes(&project.config()).unwrap();
    assert!(second.is_noop());
    assert!(second.imports_added.is_empty());
    assert!(second.files.written.is_empty());
    assert_eq!(project.routes(), routes_after_first);
    assert_eq!(all_files(&project.root.join("src/pages")), files_after_first);
}

#[test]
fn existing_page_is_kept_without_cover_and_replaced_with_cover() {
    let routes = |cover: &str| {
        format!(
            "import a from 'a'\nconst routes: RouteProps[] = [\n  {{\n    name: '看板',\n    component: '/kanban',\n{cover}  }},\n]\n"
        )
    };

    let project = Project::new(&routes("    cover: false,\n"));
    fs::create_dir_all(project.page("kanban")).unwrap();
    fs::write(project.page("kanban/index.tsx"), "hand written").unwrap();

    let report = generate_routes(&project.config()).unwrap();
    assert_eq!(
        fs::read_to_string(project.page("kanban/index.tsx")).unwrap(),
        "hand written"
    );
    assert_eq!(report.files.skipped, vec![project.page("kanban/index.tsx")]);

    let project = Project::new(&routes("    cover: true,\n"));
    fs::create_dir_all(project.page("kanban")).unwrap();
    fs::write(project.page("kanban/index.tsx"), "hand written").unwrap();

    generate_routes(&project.config()).unwrap();
    let regenerated = fs::read_to_string(project.page("kanban/index.tsx")).unwrap();
    assert!(regenerated.contains("// @page 看板"));
    assert!(regenerated.contains("const Kanban = defineComponent"));
}

#[test]
fn existing_page_without_cover_is_a_configuration_error() {
    let project = Project::new(
        "import a from 'a'\nconst routes: RouteProps[] = [\n  { name: '新页面', component: '/fresh' },\n  { name: '看板', component: '/kanban' },\n]\n",
    );
    fs::create_dir_all(project.page("kanban")).unwrap();
    fs::write(project.page("kanban/index.tsx"), "hand written").unwrap();
    let before = project.routes();

    let err = generate_routes(&project.config()).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Config(ConfigError::CoverUnspecified { ref page, .. }) if page == "/kanban"
    ));
    assert_eq!(err.exit_code(), 2);

    // 何も書かない
    assert_eq!(
        fs::read_to_string(project.page("kanban/index.tsx")).unwrap(),
        "hand written"
    );
    assert!(!project.page("fresh").exists());
    assert_eq!(project.routes(), before);
}

#[test]
fn child_added_under_generated_parent_lands_in_parent_directory() {
    let project = Project::new(ROUTES);
    generate_routes(&project.config()).unwrap();

    // 生成済みの親 (component: UsersDetail) の下に新しい子を追加する
    let edited = project.routes().replace(
        "    hideInMenu: true,\n    component: UsersDetail,\n",
        "    hideInMenu: true,\n    component: UsersDetail,\n    routes: [{ name: '日志', component: '/log', service: true }],\n",
    );
    fs::write(project.root.join("src/routes/index.tsx"), edited).unwrap();

    let report = generate_routes(&project.config()).unwrap();
    assert!(report.imports_added.contains(&"import UsersDetailLog from '@/pages/users/detail/log'".to_string()));
    assert!(project.page("users/detail/log/index.tsx").is_file());
    assert!(project.page("users/detail/log/service.tsx").is_file());
    assert!(!project.routes().contains("service: true"));
}

#[test]
fn missing_route_file_touches_nothing() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("package.json"), r#"{ "routes": "/src/nope.tsx" }"#).unwrap();

    let config = ProjectConfig::load(tmp.path(), &Overrides::default()).unwrap();
    let err = generate_routes(&config).unwrap_err();

    assert!(matches!(err, GenerateError::Config(ConfigError::RoutesFileMissing(_))));
    assert_eq!(err.exit_code(), 2);
    assert!(!tmp.path().join("src").exists());
}

#[test]
fn parse_errors_leave_filesystem_untouched() {
    let project = Project::new(
        "const routes: RouteProps[] = [\n  { name: 'a', component: '/a', table: isTable() },\n]\n",
    );
    let before = project.routes();

    let err = generate_routes(&project.config()).unwrap_err();
    assert_eq!(err.exit_code(), 3);
    assert!(!project.root.join("src/pages").exists());
    assert_eq!(project.routes(), before);
}

#[test]
fn identifier_collision_is_reported_before_writing() {
    let project = Project::new(
        "const routes: RouteProps[] = [\n  { name: 'a', component: '/user/list' },\n  { name: 'b', component: '/userList' },\n]\n",
    );

    let err = generate_routes(&project.config()).unwrap_err();
    assert!(matches!(err, GenerateError::Config(ConfigError::IdentifierCollision { .. })));
    assert!(!project.root.join("src/pages").exists());
}

#[test]
fn template_directory_override_from_package_json() {
    let project = Project::new(
        "const routes: RouteProps[] = [\n  { name: '报表', component: '/report', table: true, service: true },\n]\n",
    );
    let tpl = project.root.join("scaffold");
    fs::create_dir_all(&tpl).unwrap();
    fs::write(tpl.join("index.tsx"), "blank HEADERTITLE COMPONENT").unwrap();
    fs::write(tpl.join("table.tsx"), "table HEADERTITLE COMPONENT").unwrap();
    fs::write(tpl.join("service.tsx"), "service HEADERTITLE").unwrap();
    fs::write(
        project.root.join("package.json"),
        r#"{ "name": "demo", "template": "scaffold" }"#,
    )
    .unwrap();

    generate_routes(&project.config()).unwrap();

    assert_eq!(
        fs::read_to_string(project.page("report/index.tsx")).unwrap(),
        "table 报表 Report"
    );
    assert_eq!(
        fs::read_to_string(project.page("report/service.tsx")).unwrap(),
        "service 报表"
    );
    assert_eq!(
        project.routes(),
        "import Report from '@/pages/report'\nconst routes: RouteProps[] = [\n  { name: '报表', component: Report },\n]\n"
    );
}
