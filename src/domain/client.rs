// ==========================================
// 藻类养殖 ATP 系统 - 客户领域模型
// ==========================================
// 对齐: clientes 表
// 约束: empresa 唯一, 订单按 empresa 关联 (pedidos.cliente)
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Client - 客户 (Cliente)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub client_id: i64,
    pub company: String,          // 公司名 (唯一)
    pub contact: Option<String>,  // 联系人
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

// ==========================================
// ClientInput - 新建/修改客户请求
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientInput {
    pub company: String,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl ClientInput {
    pub fn new(company: &str) -> Self {
        Self {
            company: company.to_string(),
            ..Self::default()
        }
    }

    pub fn with_contact(mut self, contact: &str) -> Self {
        self.contact = Some(contact.to_string());
        self
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_string());
        self
    }

    pub fn with_phone(mut self, phone: &str) -> Self {
        self.phone = Some(phone.to_string());
        self
    }

    pub fn with_address(mut self, address: &str) -> Self {
        self.address = Some(address.to_string());
        self
    }

    /// 去除首尾空白, 空的可选字段归为 None
    pub fn normalized(&self) -> Self {
        fn clean(value: &Option<String>) -> Option<String> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        }
        Self {
            company: self.company.trim().to_string(),
            contact: clean(&self.contact),
            email: clean(&self.email),
            phone: clean(&self.phone),
            address: clean(&self.address),
        }
    }
}
