use crate::api::address::CreateAddress;
use crate::api::education::CreateEducation;
use crate::api::employee::{
    AssignRoleReq, EmployeeDetail, EmployeeListItem, EmployeeListResponse, UpdateMe,
};
use crate::api::employee_image::UploadImage;
use crate::api::permission::CreatePermission;
use crate::api::request::{CreateRequest, RequestListResponse, UpdateRequest};
use crate::api::role::{CreateRole, RoleResponse};
use crate::api::team::CreateTeam;
use crate::model::address::Address;
use crate::model::education::Education;
use crate::model::employee::Employee;
use crate::model::employee_image::EmployeeImage;
use crate::model::permission::Permission;
use crate::model::request::Request;
use crate::model::role::Role;
use crate::model::team::Team;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Employee Management API",
        version = "1.0.0",
        description = r#"
## Employee Management System

REST backend for managing employees, roles, teams and permissions within
an organization.

### 🔹 Key Features
- **Employee Management**
  - Self-service profiles, staff-managed records, role assignment
- **Request Management**
  - Leave/expense/remote-work requests with an approval workflow
- **Organization Structure**
  - Teams, roles with a reporting tree, and named permissions
- **Sub-resources**
  - Per-employee education history, address and profile image

### 🔐 Security
Endpoints are protected with **JWT Bearer authentication** (`Bearer` or
`JWT` header schemes). Mutations on permissions, roles and employees
require staff privilege; request approval requires the **Admin** or
**Manager** access level.

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for employee and request listings
- Permission and role listings are served through a read-through cache

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::permission::list_permissions,
        crate::api::permission::create_permission,
        crate::api::permission::get_permission,
        crate::api::permission::update_permission,
        crate::api::permission::delete_permission,

        crate::api::team::list_teams,
        crate::api::team::create_team,
        crate::api::team::get_team,
        crate::api::team::update_team,
        crate::api::team::delete_team,

        crate::api::role::list_roles,
        crate::api::role::create_role,
        crate::api::role::get_role,
        crate::api::role::update_role,
        crate::api::role::delete_role,

        crate::api::employee::list_employees,
        crate::api::employee::me,
        crate::api::employee::update_me,
        crate::api::employee::assign_role,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::request::list_requests,
        crate::api::request::create_request,
        crate::api::request::get_request,
        crate::api::request::update_request,
        crate::api::request::delete_request,
        crate::api::request::approve_request,
        crate::api::request::reject_request,

        crate::api::education::list_educations,
        crate::api::education::create_education,

        crate::api::address::get_address,
        crate::api::address::create_address,

        crate::api::employee_image::get_image,
        crate::api::employee_image::put_image,
    ),
    components(
        schemas(
            Permission,
            CreatePermission,
            Team,
            CreateTeam,
            Role,
            CreateRole,
            RoleResponse,
            Employee,
            EmployeeDetail,
            EmployeeListItem,
            EmployeeListResponse,
            UpdateMe,
            AssignRoleReq,
            Request,
            CreateRequest,
            UpdateRequest,
            RequestListResponse,
            Education,
            CreateEducation,
            Address,
            CreateAddress,
            EmployeeImage,
            UploadImage,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Permission", description = "Permission management APIs"),
        (name = "Team", description = "Team management APIs"),
        (name = "Role", description = "Role management APIs"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Request", description = "Request approval workflow APIs"),
        (name = "Education", description = "Per-employee education records"),
        (name = "Address", description = "Per-employee address records"),
        (name = "EmployeeImage", description = "Profile image APIs"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
