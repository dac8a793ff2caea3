use proc_macro::TokenStream;
use quote::quote;
use syn::{parse::Parser, parse_macro_input, Data, DataStruct, DeriveInput, Fields, Meta};

/// 生成 Record trait 的实现
///
/// 自动生成 `TABLE`、`HIDDEN` 常量和 `snapshot` 方法
///
/// 使用示例：
/// ```ignore
/// #[derive(Record)]
/// #[record(table = "users")]
/// struct User {
///     id: i64,
///     name: String,
///     #[record(hidden)]
///     password: String,
///     #[record(rename = "email_verified_at")]
///     verified_at: Option<chrono::NaiveDateTime>,
///     #[skip]
///     cache: Vec<u8>,
/// }
/// ```
///
/// 字段属性：
/// - `#[record(hidden)]`：隐藏列，默认不输出
/// - `#[record(skip)]` 或 `#[skip]`：不进入快照
/// - `#[record(rename = "...")]`：指定列名
#[proc_macro_derive(Record, attributes(record, skip))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_record(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_record(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;

    // 解析 #[record(table = "...")]
    let mut table_name = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("record") {
            continue;
        }
        for meta in parse_record_metas(attr)? {
            match meta {
                Meta::NameValue(nv) if nv.path.is_ident("table") => {
                    table_name = Some(lit_str_value(&nv.value)?);
                }
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "unsupported record attribute, expected `table = \"...\"`",
                    ));
                }
            }
        }
    }

    // 如果没有指定表名，使用结构体名称的小写蛇形命名方式
    let table = table_name.unwrap_or_else(|| {
        let s = name.to_string();
        // 将 PascalCase 转换为 snake_case
        let mut result = String::new();
        for (i, c) in s.chars().enumerate() {
            if c.is_uppercase() && i > 0 {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        }
        result
    });

    if table.trim().is_empty() {
        return Err(syn::Error::new_spanned(name, "table name must not be blank"));
    }

    // 获取字段列表（必须是具名字段的结构体）
    let fields = match &input.data {
        Data::Struct(DataStruct {
            fields: Fields::Named(fields),
            ..
        }) => &fields.named,
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Record derive only supports structs with named fields",
            ));
        }
    };

    let mut field_idents: Vec<&syn::Ident> = Vec::new();
    let mut field_columns: Vec<syn::LitStr> = Vec::new();
    let mut hidden_columns: Vec<syn::LitStr> = Vec::new();

    for field in fields {
        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };
        let options = parse_field_options(field)?;
        if options.skip {
            continue;
        }

        let column = options.rename.unwrap_or_else(|| unraw(field_ident));
        // 同名列会在快照里互相覆盖
        if field_columns.iter().any(|existing| existing.value() == column) {
            return Err(syn::Error::new_spanned(
                field_ident,
                format!("duplicate column `{}`", column),
            ));
        }
        let col_lit = syn::LitStr::new(&column, proc_macro2::Span::call_site());
        if options.hidden {
            hidden_columns.push(col_lit.clone());
        }
        field_idents.push(field_ident);
        field_columns.push(col_lit);
    }

    let field_count = field_idents.len();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::rowsql::Record for #name #ty_generics #where_clause {
            const TABLE: &'static str = #table;
            const HIDDEN: &'static [&'static str] = &[#(#hidden_columns),*];

            fn snapshot(&self) -> ::rowsql::Snapshot {
                let mut snapshot = ::rowsql::Snapshot::with_capacity(#field_count);
                #(
                    snapshot.insert(
                        #field_columns,
                        ::rowsql::ToSqlValue::to_sql_value(&self.#field_idents),
                    );
                )*
                snapshot
            }
        }
    })
}

/// 字段上的 record 属性
#[derive(Default)]
struct FieldOptions {
    skip: bool,
    hidden: bool,
    rename: Option<String>,
}

fn parse_field_options(field: &syn::Field) -> syn::Result<FieldOptions> {
    let mut options = FieldOptions::default();
    for attr in &field.attrs {
        if attr.path().is_ident("skip") {
            options.skip = true;
            continue;
        }
        if !attr.path().is_ident("record") {
            continue;
        }
        for meta in parse_record_metas(attr)? {
            match &meta {
                Meta::Path(path) if path.is_ident("skip") => options.skip = true,
                Meta::Path(path) if path.is_ident("hidden") => options.hidden = true,
                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    let column = lit_str_value(&nv.value)?;
                    if column.trim().is_empty() {
                        return Err(syn::Error::new_spanned(
                            &nv.value,
                            "column name must not be blank",
                        ));
                    }
                    options.rename = Some(column);
                }
                _ => {
                    return Err(syn::Error::new_spanned(
                        &meta,
                        "unsupported record attribute, expected `hidden`, `skip` or `rename = \"...\"`",
                    ));
                }
            }
        }
    }
    Ok(options)
}

/// 解析 #[record(...)] 中逗号分隔的元数据
fn parse_record_metas(
    attr: &syn::Attribute,
) -> syn::Result<syn::punctuated::Punctuated<Meta, syn::Token![,]>> {
    match &attr.meta {
        Meta::List(list) => {
            let parser = syn::punctuated::Punctuated::<Meta, syn::Token![,]>::parse_terminated;
            parser.parse2(list.tokens.clone())
        }
        other => Err(syn::Error::new_spanned(
            other,
            "expected #[record(...)]",
        )),
    }
}

fn lit_str_value(expr: &syn::Expr) -> syn::Result<String> {
    if let syn::Expr::Lit(syn::ExprLit {
        lit: syn::Lit::Str(s),
        ..
    }) = expr
    {
        Ok(s.value())
    } else {
        Err(syn::Error::new_spanned(expr, "expected a string literal"))
    }
}

/// 去掉原始标识符的 `r#` 前缀
fn unraw(ident: &syn::Ident) -> String {
    let s = ident.to_string();
    s.strip_prefix("r#").map(str::to_string).unwrap_or(s)
}
